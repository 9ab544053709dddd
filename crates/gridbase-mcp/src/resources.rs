//! Table schemas exposed as MCP resources.
//!
//! Every accessible table surfaces as a `store://<baseId>/<tableId>/schema`
//! resource so clients can browse structure without spending tool calls.

use std::sync::Arc;

use serde_json::Value;

use gridbase_core::RecordStore;

use crate::error::McpError;
use crate::protocol::ResourceDescriptor;

const SCHEME: &str = "store://";
const SCHEMA_MIME: &str = "application/json";

/// Catalog of schema resources backed by the record store.
pub struct ResourceCatalog {
    store: Arc<dyn RecordStore>,
}

impl ResourceCatalog {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Every table schema of every accessible base.
    pub async fn list(&self) -> Result<Vec<ResourceDescriptor>, McpError> {
        let mut resources = Vec::new();
        for base in self.store.list_bases().await? {
            let tables = match self.store.base_schema(&base.id).await {
                Ok(tables) => tables,
                Err(error) => {
                    tracing::warn!(base = %base.id, %error, "schema fetch failed, skipping base");
                    continue;
                }
            };
            for table in tables {
                resources.push(ResourceDescriptor {
                    uri: format!("{SCHEME}{}/{}/schema", base.id, table.id),
                    mime_type: SCHEMA_MIME.to_string(),
                    name: format!("{} / {} schema", base.name, table.name),
                });
            }
        }
        Ok(resources)
    }

    /// Resolve a schema URI back to the full table descriptor, as JSON text.
    pub async fn read(&self, uri: &str) -> Result<(String, String), McpError> {
        let (base_id, table_id) = parse_schema_uri(uri)?;

        let tables = self.store.base_schema(base_id).await?;
        let table = tables
            .into_iter()
            .find(|t| t.id == table_id)
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;

        let descriptor = serde_json::to_value(&table)?;
        Ok((SCHEMA_MIME.to_string(), Value::to_string(&descriptor)))
    }
}

/// Parse `store://<baseId>/<tableId>/schema` into its two ids.
fn parse_schema_uri(uri: &str) -> Result<(&str, &str), McpError> {
    let rest = uri
        .strip_prefix(SCHEME)
        .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;
    let segments: Vec<&str> = rest.split('/').collect();
    match segments.as_slice() {
        [base, table, "schema"] if !base.is_empty() && !table.is_empty() => Ok((base, table)),
        _ => Err(McpError::ResourceNotFound(uri.to_string())),
    }
}
