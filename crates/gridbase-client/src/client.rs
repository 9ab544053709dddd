//! Authenticated HTTP access to the record store.
//!
//! Every call attaches the bearer credential and negotiates JSON. Non-2xx
//! responses surface as descriptive errors carrying status text and the
//! raw body, with the credential redacted first. A response that parses
//! as JSON but does not match the expected shape is a distinct error from
//! a transport failure.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use gridbase_core::{
    Base, DeletedRecord, Field, FieldSpec, ListRecordsOptions, Record, RecordPatch, RecordStore,
    ServiceConfig, StoreError, Table,
};

use crate::formula::{build_search_formula, searchable_fields};

/// HTTP implementation of [`RecordStore`].
pub struct HttpRecordStore {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct BasesPage {
    bases: Vec<Base>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TablesEnvelope {
    tables: Vec<Table>,
}

#[derive(Debug, Deserialize)]
struct RecordsPage {
    records: Vec<Record>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordsEnvelope {
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
struct DeletionsEnvelope {
    records: Vec<DeletedRecord>,
}

impl HttpRecordStore {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Strip the credential from any text surfaced to callers or logs.
    fn redact(&self, text: &str) -> String {
        text.replace(&self.api_key, "[REDACTED]")
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<T, StoreError> {
        let url = format!("{}{}", self.api_url, path);
        let mut request = self.http.request(method, &url).bearer_auth(&self.api_key);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(self.redact(&e.to_string())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(self.redact(&e.to_string())))?;

        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("unknown").to_string(),
                body: self.redact(&text),
            });
        }

        let value: Value = serde_json::from_str(&text).map_err(|e| {
            StoreError::UnexpectedShape(format!("response was not valid JSON: {e}"))
        })?;
        serde_json::from_value(value).map_err(|e| StoreError::UnexpectedShape(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, StoreError> {
        self.request(Method::GET, path, query, None).await
    }

    /// Resolve a table within a base by id or by name.
    async fn find_table(&self, base_id: &str, table_id: &str) -> Result<Table, StoreError> {
        let tables = self.base_schema(base_id).await?;
        tables
            .into_iter()
            .find(|t| t.id == table_id || t.name == table_id)
            .ok_or_else(|| {
                StoreError::NotFound(format!("table {table_id} not found in base {base_id}"))
            })
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_bases(&self) -> Result<Vec<Base>, StoreError> {
        let mut bases = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let mut query = Vec::new();
            if let Some(token) = &offset {
                query.push(("offset".to_string(), token.clone()));
            }
            let page: BasesPage = self.get("/v0/meta/bases", &query).await?;
            bases.extend(page.bases);
            match page.offset {
                Some(token) => offset = Some(token),
                None => return Ok(bases),
            }
        }
    }

    async fn base_schema(&self, base_id: &str) -> Result<Vec<Table>, StoreError> {
        let envelope: TablesEnvelope = self
            .get(&format!("/v0/meta/bases/{base_id}/tables"), &[])
            .await?;
        Ok(envelope.tables)
    }

    async fn list_records(
        &self,
        base_id: &str,
        table_id: &str,
        options: &ListRecordsOptions,
    ) -> Result<Vec<Record>, StoreError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let mut query = Vec::new();
            if let Some(max) = options.max_records {
                query.push(("maxRecords".to_string(), max.to_string()));
            }
            if let Some(formula) = &options.filter_by_formula {
                query.push(("filterByFormula".to_string(), formula.clone()));
            }
            if let Some(view) = &options.view {
                query.push(("view".to_string(), view.clone()));
            }
            if let Some(token) = &offset {
                query.push(("offset".to_string(), token.clone()));
            }

            let page: RecordsPage = self
                .get(&format!("/v0/{base_id}/{table_id}"), &query)
                .await?;
            records.extend(page.records);

            if let Some(max) = options.max_records {
                if records.len() >= max {
                    records.truncate(max);
                    return Ok(records);
                }
            }
            match page.offset {
                Some(token) => offset = Some(token),
                None => return Ok(records),
            }
        }
    }

    async fn get_record(
        &self,
        base_id: &str,
        table_id: &str,
        record_id: &str,
    ) -> Result<Record, StoreError> {
        self.get(&format!("/v0/{base_id}/{table_id}/{record_id}"), &[])
            .await
    }

    async fn create_record(
        &self,
        base_id: &str,
        table_id: &str,
        fields: &serde_json::Map<String, Value>,
    ) -> Result<Record, StoreError> {
        self.request(
            Method::POST,
            &format!("/v0/{base_id}/{table_id}"),
            &[],
            Some(json!({ "fields": fields })),
        )
        .await
    }

    async fn update_records(
        &self,
        base_id: &str,
        table_id: &str,
        records: &[RecordPatch],
    ) -> Result<Vec<Record>, StoreError> {
        let envelope: RecordsEnvelope = self
            .request(
                Method::PATCH,
                &format!("/v0/{base_id}/{table_id}"),
                &[],
                Some(json!({ "records": records })),
            )
            .await?;
        Ok(envelope.records)
    }

    async fn delete_records(
        &self,
        base_id: &str,
        table_id: &str,
        record_ids: &[String],
    ) -> Result<Vec<DeletedRecord>, StoreError> {
        let query: Vec<(String, String)> = record_ids
            .iter()
            .map(|id| ("records[]".to_string(), id.clone()))
            .collect();
        let envelope: DeletionsEnvelope = self
            .request(
                Method::DELETE,
                &format!("/v0/{base_id}/{table_id}"),
                &query,
                None,
            )
            .await?;
        Ok(envelope.records)
    }

    async fn create_table(
        &self,
        base_id: &str,
        name: &str,
        description: Option<&str>,
        fields: &[FieldSpec],
    ) -> Result<Table, StoreError> {
        let mut body = json!({ "name": name, "fields": fields });
        if let Some(description) = description {
            body["description"] = json!(description);
        }
        self.request(
            Method::POST,
            &format!("/v0/meta/bases/{base_id}/tables"),
            &[],
            Some(body),
        )
        .await
    }

    async fn update_table(
        &self,
        base_id: &str,
        table_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Table, StoreError> {
        let mut body = json!({});
        if let Some(name) = name {
            body["name"] = json!(name);
        }
        if let Some(description) = description {
            body["description"] = json!(description);
        }
        self.request(
            Method::PATCH,
            &format!("/v0/meta/bases/{base_id}/tables/{table_id}"),
            &[],
            Some(body),
        )
        .await
    }

    async fn create_field(
        &self,
        base_id: &str,
        table_id: &str,
        field: &FieldSpec,
    ) -> Result<Field, StoreError> {
        self.request(
            Method::POST,
            &format!("/v0/meta/bases/{base_id}/tables/{table_id}/fields"),
            &[],
            Some(serde_json::to_value(field).map_err(|e| {
                StoreError::UnexpectedShape(format!("field spec failed to serialize: {e}"))
            })?),
        )
        .await
    }

    async fn update_field(
        &self,
        base_id: &str,
        table_id: &str,
        field_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Field, StoreError> {
        let mut body = json!({});
        if let Some(name) = name {
            body["name"] = json!(name);
        }
        if let Some(description) = description {
            body["description"] = json!(description);
        }
        self.request(
            Method::PATCH,
            &format!("/v0/meta/bases/{base_id}/tables/{table_id}/fields/{field_id}"),
            &[],
            Some(body),
        )
        .await
    }

    async fn search_records(
        &self,
        base_id: &str,
        table_id: &str,
        term: &str,
        field_names: Option<&[String]>,
        max_records: Option<usize>,
        view: Option<&str>,
    ) -> Result<Vec<Record>, StoreError> {
        let table = self.find_table(base_id, table_id).await?;
        let targets = searchable_fields(&table.fields, field_names)?;

        let Some(formula) = build_search_formula(term, &targets) else {
            tracing::debug!(base = base_id, table = %table.id, "no searchable fields, skipping");
            return Ok(Vec::new());
        };

        let options = ListRecordsOptions {
            max_records,
            filter_by_formula: Some(formula),
            view: view.map(String::from),
        };
        self.list_records(base_id, &table.id, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> HttpRecordStore {
        let config = ServiceConfig::from_lookup(|name| match name {
            "GRIDBASE_API_KEY" => Some("secret-key-123".to_string()),
            "GRIDBASE_API_URL" => Some("https://api.example.test/".to_string()),
            _ => None,
        })
        .unwrap();
        HttpRecordStore::new(&config)
    }

    #[test]
    fn api_url_is_normalized() {
        let store = test_store();
        assert_eq!(store.api_url, "https://api.example.test");
    }

    #[test]
    fn credential_is_redacted_from_error_bodies() {
        let store = test_store();
        let redacted = store.redact("401 token secret-key-123 rejected");
        assert!(!redacted.contains("secret-key-123"));
        assert!(redacted.contains("[REDACTED]"));
    }

    #[test]
    fn record_pages_deserialize() {
        let page: RecordsPage = serde_json::from_str(
            r#"{"records":[{"id":"rec1","fields":{"Name":"A"}}],"offset":"next"}"#,
        )
        .unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.offset.as_deref(), Some("next"));
    }

    #[test]
    fn shape_mismatch_is_detected() {
        let result: Result<BasesPage, _> =
            serde_json::from_str(r#"{"bases":[{"id":"app1"}]}"#);
        assert!(result.is_err());
    }
}
