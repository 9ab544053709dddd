//! Tool dispatch.
//!
//! The executor is the one place tool failures are allowed to surface, and
//! they surface as data: every call, valid or not, produces a
//! `CallToolResponse`. Unknown tools, argument mismatches, and backend
//! errors all become `isError: true` envelopes rather than protocol errors,
//! so a client can always read the outcome from the tool result.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use gridbase_core::{FieldSpec, ListRecordsOptions, RecordPatch, RecordStore, ServiceConfig};

use crate::error::McpError;
use crate::normalize::{table_to_json, DetailLevel};
use crate::protocol::CallToolResponse;
use crate::search::Searcher;
use crate::tools::{ToolProfile, ToolRegistry};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListBasesArgs {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FetchArgs {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ListTablesArgs {
    base_id: String,
    #[serde(default)]
    detail_level: DetailLevel,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DescribeTableArgs {
    base_id: String,
    table_id: String,
    #[serde(default)]
    detail_level: DetailLevel,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ListRecordsArgs {
    base_id: String,
    table_id: String,
    max_records: Option<usize>,
    filter_by_formula: Option<String>,
    view: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SearchRecordsArgs {
    base_id: String,
    table_id: String,
    search_term: String,
    field_names: Option<Vec<String>>,
    max_records: Option<usize>,
    view: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct GetRecordArgs {
    base_id: String,
    table_id: String,
    record_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CreateRecordArgs {
    base_id: String,
    table_id: String,
    fields: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdateRecordsArgs {
    base_id: String,
    table_id: String,
    records: Vec<RecordPatch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DeleteRecordsArgs {
    base_id: String,
    table_id: String,
    record_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CreateTableArgs {
    base_id: String,
    name: String,
    description: Option<String>,
    fields: Vec<FieldSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdateTableArgs {
    base_id: String,
    table_id: String,
    name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CreateFieldArgs {
    base_id: String,
    table_id: String,
    field: FieldSpec,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdateFieldArgs {
    base_id: String,
    table_id: String,
    field_id: String,
    name: Option<String>,
    description: Option<String>,
}

/// Executes tool calls against the record store.
pub struct ToolExecutor {
    store: Arc<dyn RecordStore>,
    registry: ToolRegistry,
    searcher: Searcher,
}

impl ToolExecutor {
    pub fn new(
        store: Arc<dyn RecordStore>,
        config: Arc<ServiceConfig>,
        profile: ToolProfile,
    ) -> Self {
        Self {
            searcher: Searcher::new(Arc::clone(&store), config),
            registry: ToolRegistry::for_profile(profile),
            store,
        }
    }

    /// The tools this executor will accept, for `tools/list`.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute a tool call. Never fails: every error becomes an
    /// `isError: true` envelope.
    pub async fn execute(&self, name: &str, arguments: Value) -> CallToolResponse {
        if !self.registry.contains(name) {
            return CallToolResponse::failure(format!("Unknown tool: {name}"));
        }
        match self.dispatch(name, arguments).await {
            Ok(value) => CallToolResponse::success(&value),
            Err(error) => {
                tracing::debug!(tool = name, %error, "tool call failed");
                CallToolResponse::failure(error.to_string())
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        match name {
            "search" => {
                let args: SearchArgs = parse_args(name, arguments)?;
                let results = self.searcher.search(&args.query).await?;
                Ok(json!({ "results": results }))
            }
            "fetch" => {
                let args: FetchArgs = parse_args(name, arguments)?;
                let item = self.searcher.fetch(&args.id).await?;
                Ok(serde_json::to_value(item)?)
            }
            "list_bases" => {
                // Takes no arguments, but a stray key is still a mismatch.
                let ListBasesArgs {} = parse_args(name, arguments)?;
                let bases = self.store.list_bases().await?;
                Ok(json!({ "bases": bases }))
            }
            "list_tables" => {
                let args: ListTablesArgs = parse_args(name, arguments)?;
                let tables = self.store.base_schema(&args.base_id).await?;
                let shaped: Vec<Value> = tables
                    .iter()
                    .map(|t| table_to_json(t, args.detail_level))
                    .collect();
                Ok(json!({ "tables": shaped }))
            }
            "describe_table" => {
                let args: DescribeTableArgs = parse_args(name, arguments)?;
                let tables = self.store.base_schema(&args.base_id).await?;
                let table = tables
                    .iter()
                    .find(|t| t.id == args.table_id || t.name == args.table_id)
                    .ok_or_else(|| {
                        McpError::Store(gridbase_core::StoreError::NotFound(format!(
                            "table {} not found in base {}",
                            args.table_id, args.base_id
                        )))
                    })?;
                Ok(table_to_json(table, args.detail_level))
            }
            "list_records" => {
                let args: ListRecordsArgs = parse_args(name, arguments)?;
                let options = ListRecordsOptions {
                    max_records: args.max_records,
                    filter_by_formula: args.filter_by_formula,
                    view: args.view,
                };
                let records = self
                    .store
                    .list_records(&args.base_id, &args.table_id, &options)
                    .await?;
                Ok(json!({ "records": records }))
            }
            "search_records" => {
                let args: SearchRecordsArgs = parse_args(name, arguments)?;
                let records = self
                    .store
                    .search_records(
                        &args.base_id,
                        &args.table_id,
                        &args.search_term,
                        args.field_names.as_deref(),
                        args.max_records,
                        args.view.as_deref(),
                    )
                    .await?;
                Ok(json!({ "records": records }))
            }
            "get_record" => {
                let args: GetRecordArgs = parse_args(name, arguments)?;
                let record = self
                    .store
                    .get_record(&args.base_id, &args.table_id, &args.record_id)
                    .await?;
                Ok(serde_json::to_value(record)?)
            }
            "create_record" => {
                let args: CreateRecordArgs = parse_args(name, arguments)?;
                let record = self
                    .store
                    .create_record(&args.base_id, &args.table_id, &args.fields)
                    .await?;
                Ok(serde_json::to_value(record)?)
            }
            "update_records" => {
                let args: UpdateRecordsArgs = parse_args(name, arguments)?;
                let records = self
                    .store
                    .update_records(&args.base_id, &args.table_id, &args.records)
                    .await?;
                Ok(json!({ "records": records }))
            }
            "delete_records" => {
                let args: DeleteRecordsArgs = parse_args(name, arguments)?;
                let deleted = self
                    .store
                    .delete_records(&args.base_id, &args.table_id, &args.record_ids)
                    .await?;
                Ok(json!({ "records": deleted }))
            }
            "create_table" => {
                let args: CreateTableArgs = parse_args(name, arguments)?;
                let table = self
                    .store
                    .create_table(
                        &args.base_id,
                        &args.name,
                        args.description.as_deref(),
                        &args.fields,
                    )
                    .await?;
                Ok(serde_json::to_value(table)?)
            }
            "update_table" => {
                let args: UpdateTableArgs = parse_args(name, arguments)?;
                let table = self
                    .store
                    .update_table(
                        &args.base_id,
                        &args.table_id,
                        args.name.as_deref(),
                        args.description.as_deref(),
                    )
                    .await?;
                Ok(serde_json::to_value(table)?)
            }
            "create_field" => {
                let args: CreateFieldArgs = parse_args(name, arguments)?;
                let field = self
                    .store
                    .create_field(&args.base_id, &args.table_id, &args.field)
                    .await?;
                Ok(serde_json::to_value(field)?)
            }
            "update_field" => {
                let args: UpdateFieldArgs = parse_args(name, arguments)?;
                let field = self
                    .store
                    .update_field(
                        &args.base_id,
                        &args.table_id,
                        &args.field_id,
                        args.name.as_deref(),
                        args.description.as_deref(),
                    )
                    .await?;
                Ok(serde_json::to_value(field)?)
            }
            // Registry membership was checked in execute().
            other => Err(McpError::ToolNotFound {
                name: other.to_string(),
            }),
        }
    }
}

/// Deserialize tool arguments, treating a missing arguments object as `{}`.
fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, McpError> {
    let arguments = if arguments.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}
