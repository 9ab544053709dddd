//! Tool registry for MCP tools.
//!
//! The tool surface is fixed at startup by the selected profile and never
//! changes per call. Definitions carry closed JSON Schemas so clients can
//! reject unknown arguments before the call reaches the dispatcher.

use serde_json::json;

use crate::protocol::ToolDefinition;

/// Which tool surface the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolProfile {
    /// `search` and `fetch` only, for deep-research style clients.
    Minimal,
    /// The complete CRUD and schema tool set.
    #[default]
    Full,
}

impl std::str::FromStr for ToolProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minimal" => Ok(Self::Minimal),
            "full" => Ok(Self::Full),
            other => Err(format!("unknown tool profile '{other}' (expected minimal or full)")),
        }
    }
}

/// Registry of the tools advertised by `tools/list`.
///
/// Kept as a vector so listing order is stable across calls.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Build the registry for a profile.
    pub fn for_profile(profile: ToolProfile) -> Self {
        let tools = match profile {
            ToolProfile::Minimal => vec![search_tool(), fetch_tool()],
            ToolProfile::Full => vec![
                list_bases_tool(),
                list_tables_tool(),
                describe_table_tool(),
                list_records_tool(),
                search_records_tool(),
                get_record_tool(),
                create_record_tool(),
                update_records_tool(),
                delete_records_tool(),
                create_table_tool(),
                update_table_tool(),
                create_field_tool(),
                update_field_tool(),
            ],
        };
        Self { tools }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// List all tools in registration order.
    pub fn list(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Get tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

fn tool(name: &str, description: &str, input_schema: serde_json::Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

fn search_tool() -> ToolDefinition {
    tool(
        "search",
        "Search across every accessible base and table for records matching a query. \
         Returns capped, snippeted results with composite ids usable by fetch.",
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Free-text search term"
                }
            },
            "required": ["query"],
            "additionalProperties": false
        }),
    )
}

fn fetch_tool() -> ToolDefinition {
    tool(
        "fetch",
        "Fetch the full contents of a record previously returned by search, \
         addressed by its composite '<baseId>:<tableId>:<recordId>' id.",
        json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "string",
                    "description": "Composite record id: <baseId>:<tableId>:<recordId>"
                }
            },
            "required": ["id"],
            "additionalProperties": false
        }),
    )
}

fn list_bases_tool() -> ToolDefinition {
    tool(
        "list_bases",
        "List every base the configured credential can access.",
        json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        }),
    )
}

fn detail_level_property() -> serde_json::Value {
    json!({
        "type": "string",
        "enum": ["tableIdentifiersOnly", "identifiersOnly", "full"],
        "description": "How much of each table descriptor to return (default full)"
    })
}

fn list_tables_tool() -> ToolDefinition {
    tool(
        "list_tables",
        "List the tables of a base, with optional detail trimming.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "detailLevel": detail_level_property()
            },
            "required": ["baseId"],
            "additionalProperties": false
        }),
    )
}

fn describe_table_tool() -> ToolDefinition {
    tool(
        "describe_table",
        "Describe a single table of a base, with optional detail trimming.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "tableId": {"type": "string"},
                "detailLevel": detail_level_property()
            },
            "required": ["baseId", "tableId"],
            "additionalProperties": false
        }),
    )
}

fn list_records_tool() -> ToolDefinition {
    tool(
        "list_records",
        "List records of a table, optionally filtered by a formula, capped, or scoped to a view.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "tableId": {"type": "string"},
                "maxRecords": {"type": "integer", "minimum": 1},
                "filterByFormula": {"type": "string"},
                "view": {"type": "string"}
            },
            "required": ["baseId", "tableId"],
            "additionalProperties": false
        }),
    )
}

fn search_records_tool() -> ToolDefinition {
    tool(
        "search_records",
        "Search a single table for records containing a term in its text fields.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "tableId": {"type": "string"},
                "searchTerm": {"type": "string"},
                "fieldNames": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Restrict the search to these text fields (by name)"
                },
                "maxRecords": {"type": "integer", "minimum": 1},
                "view": {"type": "string"}
            },
            "required": ["baseId", "tableId", "searchTerm"],
            "additionalProperties": false
        }),
    )
}

fn get_record_tool() -> ToolDefinition {
    tool(
        "get_record",
        "Get a single record by id.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "tableId": {"type": "string"},
                "recordId": {"type": "string"}
            },
            "required": ["baseId", "tableId", "recordId"],
            "additionalProperties": false
        }),
    )
}

fn create_record_tool() -> ToolDefinition {
    tool(
        "create_record",
        "Create a record with the given field values.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "tableId": {"type": "string"},
                "fields": {"type": "object"}
            },
            "required": ["baseId", "tableId", "fields"],
            "additionalProperties": false
        }),
    )
}

fn update_records_tool() -> ToolDefinition {
    tool(
        "update_records",
        "Update up to a batch of records, each addressed by id with replacement field values.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "tableId": {"type": "string"},
                "records": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "fields": {"type": "object"}
                        },
                        "required": ["id", "fields"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["baseId", "tableId", "records"],
            "additionalProperties": false
        }),
    )
}

fn delete_records_tool() -> ToolDefinition {
    tool(
        "delete_records",
        "Delete records by id.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "tableId": {"type": "string"},
                "recordIds": {
                    "type": "array",
                    "items": {"type": "string"}
                }
            },
            "required": ["baseId", "tableId", "recordIds"],
            "additionalProperties": false
        }),
    )
}

fn field_spec_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "type": {"type": "string"},
            "description": {"type": "string"},
            "options": {"type": "object"}
        },
        "required": ["name", "type"],
        "additionalProperties": false
    })
}

fn create_table_tool() -> ToolDefinition {
    tool(
        "create_table",
        "Create a table in a base with an initial field set.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "name": {"type": "string"},
                "description": {"type": "string"},
                "fields": {"type": "array", "items": field_spec_schema()}
            },
            "required": ["baseId", "name", "fields"],
            "additionalProperties": false
        }),
    )
}

fn update_table_tool() -> ToolDefinition {
    tool(
        "update_table",
        "Rename a table or update its description.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "tableId": {"type": "string"},
                "name": {"type": "string"},
                "description": {"type": "string"}
            },
            "required": ["baseId", "tableId"],
            "additionalProperties": false
        }),
    )
}

fn create_field_tool() -> ToolDefinition {
    tool(
        "create_field",
        "Add a field to a table.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "tableId": {"type": "string"},
                "field": field_spec_schema()
            },
            "required": ["baseId", "tableId", "field"],
            "additionalProperties": false
        }),
    )
}

fn update_field_tool() -> ToolDefinition {
    tool(
        "update_field",
        "Rename a field or update its description.",
        json!({
            "type": "object",
            "properties": {
                "baseId": {"type": "string"},
                "tableId": {"type": "string"},
                "fieldId": {"type": "string"},
                "name": {"type": "string"},
                "description": {"type": "string"}
            },
            "required": ["baseId", "tableId", "fieldId"],
            "additionalProperties": false
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_profile_exposes_search_and_fetch_only() {
        let registry = ToolRegistry::for_profile(ToolProfile::Minimal);
        assert_eq!(registry.names(), vec!["search", "fetch"]);
        assert!(!registry.contains("list_bases"));
    }

    #[test]
    fn full_profile_exposes_all_crud_tools() {
        let registry = ToolRegistry::for_profile(ToolProfile::Full);
        assert_eq!(registry.list().len(), 13);
        for name in [
            "list_bases",
            "list_tables",
            "describe_table",
            "list_records",
            "search_records",
            "get_record",
            "create_record",
            "update_records",
            "delete_records",
            "create_table",
            "update_table",
            "create_field",
            "update_field",
        ] {
            assert!(registry.contains(name), "missing tool {name}");
        }
        assert!(!registry.contains("search"));
    }

    #[test]
    fn every_schema_rejects_unknown_properties() {
        for profile in [ToolProfile::Minimal, ToolProfile::Full] {
            for tool in ToolRegistry::for_profile(profile).list() {
                assert_eq!(
                    tool.input_schema["additionalProperties"],
                    serde_json::json!(false),
                    "tool {} must carry a closed schema",
                    tool.name
                );
            }
        }
    }

    #[test]
    fn profile_parses_from_str() {
        assert_eq!("minimal".parse::<ToolProfile>().unwrap(), ToolProfile::Minimal);
        assert_eq!("Full".parse::<ToolProfile>().unwrap(), ToolProfile::Full);
        assert!("fancy".parse::<ToolProfile>().is_err());
    }
}
