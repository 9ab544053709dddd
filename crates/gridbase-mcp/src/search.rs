//! Generic search over every accessible base and table, plus the fetch
//! counterpart that resolves the composite ids search hands out.
//!
//! Search walks bases in listing order and tables in schema order,
//! sequentially. Results are capped globally and per table, snippeted, and
//! returned in discovery order — there is no relevance ranking without a
//! server-side index. A table that fails to search is logged and skipped so
//! one broken table cannot empty the whole result set.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use gridbase_core::{stringify_field_value, Record, RecordStore, ServiceConfig, Table};

use crate::error::McpError;

const SNIPPET_MAX_FIELDS: usize = 8;
const SNIPPET_MAX_CHARS: usize = 400;

/// One hit returned by the generic `search` tool.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    /// Composite `<baseId>:<tableId>:<recordId>` id, resolvable by fetch.
    pub id: String,
    pub title: String,
    pub text: String,
    pub url: String,
}

/// The full record returned by the `fetch` tool.
#[derive(Debug, Clone, Serialize)]
pub struct FetchResultItem {
    pub id: String,
    pub title: String,
    pub text: String,
    pub url: String,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchMetadata {
    pub base_id: String,
    pub table_id: String,
}

/// Index-free search synthesizer over a [`RecordStore`].
pub struct Searcher {
    store: Arc<dyn RecordStore>,
    config: Arc<ServiceConfig>,
}

impl Searcher {
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<ServiceConfig>) -> Self {
        Self { store, config }
    }

    /// Search every allowed base for records matching `query`.
    ///
    /// Stops as soon as the global result cap is reached; each table
    /// contributes at most the per-table cap. Per-table failures are
    /// logged and skipped.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, McpError> {
        let mut results = Vec::new();
        let bases = self.store.list_bases().await?;

        'bases: for base in &bases {
            if !self.config.base_allowed(&base.id) {
                continue;
            }

            let tables = match self.store.base_schema(&base.id).await {
                Ok(tables) => tables,
                Err(error) => {
                    tracing::warn!(base = %base.id, %error, "schema fetch failed, skipping base");
                    continue;
                }
            };

            for table in &tables {
                let remaining = self.config.max_search_results - results.len();
                if remaining == 0 {
                    break 'bases;
                }
                let limit = remaining.min(self.config.max_per_table);

                let records = match self
                    .store
                    .search_records(&base.id, &table.id, query, None, Some(limit), None)
                    .await
                {
                    Ok(records) => records,
                    Err(error) => {
                        tracing::warn!(
                            base = %base.id,
                            table = %table.id,
                            %error,
                            "table search failed, skipping table"
                        );
                        continue;
                    }
                };

                for record in records.iter().take(limit) {
                    results.push(self.result_item(base.id.as_str(), &base.name, table, record));
                    if results.len() >= self.config.max_search_results {
                        break 'bases;
                    }
                }
            }
        }

        Ok(results)
    }

    /// Resolve a composite `<baseId>:<tableId>:<recordId>` id back into the
    /// full record. Malformed ids fail before the store is consulted.
    pub async fn fetch(&self, id: &str) -> Result<FetchResultItem, McpError> {
        let (base_id, table_id, record_id) = parse_composite_id(id)?;

        let (record, schema) = tokio::join!(
            self.store.get_record(base_id, table_id, record_id),
            self.store.base_schema(base_id),
        );
        let record = record?;

        // The schema is advisory here: without it the record id still makes
        // a serviceable title.
        let table = schema
            .ok()
            .and_then(|tables| tables.into_iter().find(|t| t.id == table_id));

        let title = match &table {
            Some(table) => match primary_field_text(table, &record) {
                Some(text) => format!("{} {}", table.name, text),
                None => format!("{} {}", table.name, record.id),
            },
            None => format!("{} {}", table_id, record.id),
        };

        Ok(FetchResultItem {
            id: id.to_string(),
            title,
            text: Value::Object(record.fields.clone()).to_string(),
            url: self.record_url(base_id, table_id, record_id),
            metadata: FetchMetadata {
                base_id: base_id.to_string(),
                table_id: table_id.to_string(),
            },
        })
    }

    fn result_item(
        &self,
        base_id: &str,
        base_name: &str,
        table: &Table,
        record: &Record,
    ) -> SearchResultItem {
        let primary = primary_field_text(table, record);
        let title = format!(
            "{} – {} – {}",
            base_name,
            table.name,
            primary.as_deref().unwrap_or(&record.id)
        );

        SearchResultItem {
            id: format!("{}:{}:{}", base_id, table.id, record.id),
            title,
            text: build_snippet(table, record, &self.config.priority_fields),
            url: self.record_url(base_id, &table.id, &record.id),
        }
    }

    fn record_url(&self, base_id: &str, table_id: &str, record_id: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.web_url.trim_end_matches('/'),
            base_id,
            table_id,
            record_id
        )
    }
}

/// Split a composite id into exactly three non-empty parts.
fn parse_composite_id(id: &str) -> Result<(&str, &str, &str), McpError> {
    let parts: Vec<&str> = id.split(':').collect();
    match parts.as_slice() {
        [base, table, record] if !base.is_empty() && !table.is_empty() && !record.is_empty() => {
            Ok((base, table, record))
        }
        _ => Err(McpError::InvalidFetchId(id.to_string())),
    }
}

/// The stringified primary-field value of a record, if present and non-empty.
fn primary_field_text(table: &Table, record: &Record) -> Option<String> {
    let field = table.primary_field()?;
    let value = record.fields.get(&field.name)?;
    let text = stringify_field_value(value);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Assemble a bounded text snippet from a record's fields.
///
/// Field order: the table's primary field, then the configured priority
/// names (matched case-insensitively by substring), then whatever remains,
/// up to eight fields with non-empty values. Falls back to a raw JSON dump
/// when nothing stringifies.
fn build_snippet(table: &Table, record: &Record, priority_fields: &[String]) -> String {
    let mut ordered: Vec<&str> = Vec::with_capacity(record.fields.len());

    if let Some(primary) = table.primary_field() {
        if record.fields.contains_key(&primary.name) {
            ordered.push(primary.name.as_str());
        }
    }

    for hint in priority_fields {
        for name in record.fields.keys() {
            if ordered.contains(&name.as_str()) {
                continue;
            }
            if name.to_lowercase().contains(&hint.to_lowercase()) {
                ordered.push(name.as_str());
            }
        }
    }

    for name in record.fields.keys() {
        if !ordered.contains(&name.as_str()) {
            ordered.push(name.as_str());
        }
    }

    let mut parts = Vec::new();
    for name in ordered {
        if parts.len() >= SNIPPET_MAX_FIELDS {
            break;
        }
        let Some(value) = record.fields.get(name) else {
            continue;
        };
        let text = stringify_field_value(value);
        if !text.is_empty() {
            parts.push(format!("{name}: {text}"));
        }
    }

    let snippet = if parts.is_empty() {
        Value::Object(record.fields.clone()).to_string()
    } else {
        parts.join(" | ")
    };
    truncate_chars(&snippet, SNIPPET_MAX_CHARS)
}

/// Truncate to at most `max` characters, on a character boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table_with_primary() -> Table {
        serde_json::from_value(json!({
            "id": "tbl1",
            "name": "Contacts",
            "primaryFieldId": "fld1",
            "fields": [
                {"id": "fld1", "name": "Full Name", "type": "singleLineText"},
                {"id": "fld2", "name": "Notes", "type": "multilineText"},
                {"id": "fld3", "name": "Age", "type": "number"}
            ],
            "views": []
        }))
        .unwrap()
    }

    fn record(fields: Value) -> Record {
        serde_json::from_value(json!({"id": "rec1", "fields": fields})).unwrap()
    }

    #[test]
    fn composite_id_requires_three_non_empty_parts() {
        assert!(parse_composite_id("a:b:c").is_ok());
        assert!(parse_composite_id("notthreeparts").is_err());
        assert!(parse_composite_id("a:b").is_err());
        assert!(parse_composite_id("a:b:c:d").is_err());
        assert!(parse_composite_id("a::c").is_err());
    }

    #[test]
    fn snippet_puts_primary_field_first() {
        let snippet = build_snippet(
            &table_with_primary(),
            &record(json!({"Notes": "long note", "Full Name": "Ada"})),
            &["name".to_string(), "notes".to_string()],
        );
        assert!(snippet.starts_with("Full Name: Ada"));
        assert!(snippet.contains(" | Notes: long note"));
    }

    #[test]
    fn snippet_caps_at_eight_fields() {
        let mut fields = serde_json::Map::new();
        for i in 0..12 {
            fields.insert(format!("f{i:02}"), json!(format!("v{i}")));
        }
        let snippet = build_snippet(
            &table_with_primary(),
            &record(Value::Object(fields)),
            &[],
        );
        assert_eq!(snippet.matches(" | ").count(), SNIPPET_MAX_FIELDS - 1);
    }

    #[test]
    fn snippet_skips_empty_values() {
        let snippet = build_snippet(
            &table_with_primary(),
            &record(json!({"Full Name": null, "Notes": "kept"})),
            &[],
        );
        assert_eq!(snippet, "Notes: kept");
    }

    #[test]
    fn snippet_falls_back_to_json_dump() {
        let snippet = build_snippet(
            &table_with_primary(),
            &record(json!({"Full Name": null})),
            &[],
        );
        assert_eq!(snippet, r#"{"Full Name":null}"#);
    }

    #[test]
    fn snippet_is_bounded() {
        let snippet = build_snippet(
            &table_with_primary(),
            &record(json!({"Notes": "x".repeat(1000)})),
            &[],
        );
        assert_eq!(snippet.chars().count(), SNIPPET_MAX_CHARS);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(10);
        assert_eq!(truncate_chars(&text, 4), "éééé");
    }
}
