//! MCP protocol types.
//!
//! This module defines the JSON-RPC message types used by MCP, plus the
//! tool-call envelope: every tool call, success or failure, answers with
//! `{content: [{type: "text", text: <JSON>}], isError: bool}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// MCP tool definition advertised by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Call tool request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Call tool response. `is_error` is always present so callers can
/// distinguish success from failure without inspecting the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResponse {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl CallToolResponse {
    /// Wrap a successful tool result. The value is JSON-serialized into
    /// text content; structured content is never used, for maximum client
    /// compatibility.
    pub fn success(value: &Value) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: serde_json::to_string(value).unwrap_or_else(|_| "null".to_string()),
            }],
            is_error: false,
        }
    }

    /// Wrap a failure. The message is JSON-encoded inside the text content.
    pub fn failure(message: impl Into<String>) -> Self {
        let payload = serde_json::json!({ "error": message.into() });
        Self {
            content: vec![ToolContent::Text {
                text: payload.to_string(),
            }],
            is_error: true,
        }
    }
}

/// Tool response content. Only text is emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Resource descriptor advertised by `resources/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub uri: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_envelope_carries_json_encoded_message() {
        let response = CallToolResponse::failure("Unknown tool: delete_everything");
        assert!(response.is_error);
        let ToolContent::Text { text } = &response.content[0];
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed["error"], "Unknown tool: delete_everything");
    }

    #[test]
    fn success_envelope_serializes_payload_as_text() {
        let response = CallToolResponse::success(&json!({"records": []}));
        assert!(!response.is_error);
        let ToolContent::Text { text } = &response.content[0];
        assert_eq!(text, r#"{"records":[]}"#);
    }

    #[test]
    fn is_error_is_always_serialized() {
        let rendered = serde_json::to_value(CallToolResponse::success(&json!(1))).unwrap();
        assert_eq!(rendered["isError"], json!(false));
    }
}
