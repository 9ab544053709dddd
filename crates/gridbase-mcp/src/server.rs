//! MCP server implementation.
//!
//! Routes JSON-RPC methods to the tool executor and the resource catalog.
//! Tool failures never surface as protocol errors; a malformed request
//! (bad JSON, unknown method, bad params) gets a JSON-RPC error and the
//! server keeps serving.

use std::io::{BufRead, Write};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc;

use gridbase_core::{RecordStore, ServiceConfig};

use crate::error::McpError;
use crate::executor::ToolExecutor;
use crate::http_transport::HttpServer;
use crate::protocol::{CallToolParams, JsonRpcRequest, JsonRpcResponse};
use crate::resources::ResourceCatalog;
use crate::tools::ToolProfile;

const PROTOCOL_VERSION: &str = "2024-11-05";

/// The MCP server. Cheap to clone; the executor and catalog are shared.
#[derive(Clone)]
pub struct McpServer {
    executor: Arc<ToolExecutor>,
    resources: Arc<ResourceCatalog>,
}

impl McpServer {
    /// Create a server over a record store with the given tool profile.
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<ServiceConfig>, profile: ToolProfile) -> Self {
        Self {
            executor: Arc::new(ToolExecutor::new(Arc::clone(&store), config, profile)),
            resources: Arc::new(ResourceCatalog::new(store)),
        }
    }

    /// Run the server over stdio: one JSON-RPC message per line, one
    /// response per request, flushed immediately.
    pub async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!("Starting MCP server with stdio transport");

        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut stdout_lock = stdout.lock();

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => JsonRpcResponse::error(None, -32700, format!("Parse error: {e}")),
            };
            let response_json = serde_json::to_string(&response)?;

            writeln!(stdout_lock, "{response_json}")?;
            stdout_lock.flush()?;
        }

        Ok(())
    }

    /// Run the server over HTTP on the given port.
    pub async fn run_http(&self, port: u16) -> Result<(), McpError> {
        tracing::info!(port, "Starting MCP server with HTTP transport");

        let (request_tx, mut request_rx) =
            mpsc::channel::<(JsonRpcRequest, mpsc::Sender<JsonRpcResponse>)>(100);

        let server = self.clone();
        tokio::spawn(async move {
            while let Some((request, response_tx)) = request_rx.recv().await {
                let response = server.handle_request(request).await;
                let _ = response_tx.send(response).await;
            }
        });

        HttpServer::new(port, request_tx).run().await
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => JsonRpcResponse::success(id, json!({})),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "resources/list" => self.handle_list_resources(id).await,
            "resources/read" => self.handle_read_resource(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": "gridbase-mcp",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {},
                "resources": {}
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = self.executor.registry().list();
        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {e}"))
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        let result = self.executor.execute(&params.name, params.arguments).await;
        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, -32603, format!("Internal error: {e}")),
        }
    }

    async fn handle_list_resources(&self, id: Option<Value>) -> JsonRpcResponse {
        match self.resources.list().await {
            Ok(resources) => JsonRpcResponse::success(id, json!({ "resources": resources })),
            Err(e) => JsonRpcResponse::error(id, -32603, e.to_string()),
        }
    }

    async fn handle_read_resource(
        &self,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let uri = params
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(|v| v.as_str());

        let Some(uri) = uri else {
            return JsonRpcResponse::error(id, -32602, "Missing uri");
        };

        match self.resources.read(uri).await {
            Ok((mime_type, text)) => JsonRpcResponse::success(
                id,
                json!({
                    "contents": [{
                        "uri": uri,
                        "mimeType": mime_type,
                        "text": text
                    }]
                }),
            ),
            Err(e) => JsonRpcResponse::error(id, -32602, e.to_string()),
        }
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}
