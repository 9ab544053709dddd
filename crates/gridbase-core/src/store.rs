//! The record-store contract.
//!
//! The MCP layer is written against this trait so the dispatcher and the
//! search synthesizer can be exercised with an in-memory double; the
//! `gridbase-client` crate provides the HTTP implementation.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::model::{
    Base, DeletedRecord, Field, FieldSpec, ListRecordsOptions, Record, RecordPatch, Table,
};

/// Asynchronous access to the tabular backend.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every base the credential can see, in backend listing order.
    async fn list_bases(&self) -> Result<Vec<Base>, StoreError>;

    /// The full table set of a base, in schema order.
    async fn base_schema(&self, base_id: &str) -> Result<Vec<Table>, StoreError>;

    /// All records of a table, pagination resolved transparently.
    async fn list_records(
        &self,
        base_id: &str,
        table_id: &str,
        options: &ListRecordsOptions,
    ) -> Result<Vec<Record>, StoreError>;

    async fn get_record(
        &self,
        base_id: &str,
        table_id: &str,
        record_id: &str,
    ) -> Result<Record, StoreError>;

    async fn create_record(
        &self,
        base_id: &str,
        table_id: &str,
        fields: &serde_json::Map<String, Value>,
    ) -> Result<Record, StoreError>;

    async fn update_records(
        &self,
        base_id: &str,
        table_id: &str,
        records: &[RecordPatch],
    ) -> Result<Vec<Record>, StoreError>;

    async fn delete_records(
        &self,
        base_id: &str,
        table_id: &str,
        record_ids: &[String],
    ) -> Result<Vec<DeletedRecord>, StoreError>;

    async fn create_table(
        &self,
        base_id: &str,
        name: &str,
        description: Option<&str>,
        fields: &[FieldSpec],
    ) -> Result<Table, StoreError>;

    async fn update_table(
        &self,
        base_id: &str,
        table_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Table, StoreError>;

    async fn create_field(
        &self,
        base_id: &str,
        table_id: &str,
        field: &FieldSpec,
    ) -> Result<Field, StoreError>;

    async fn update_field(
        &self,
        base_id: &str,
        table_id: &str,
        field_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Field, StoreError>;

    /// Free-text search via the backend's formula predicate.
    ///
    /// With no explicit field names every text-like field of the table is
    /// searched; explicitly named fields must all be text-like fields of
    /// the table or the call fails without touching the records endpoint.
    async fn search_records(
        &self,
        base_id: &str,
        table_id: &str,
        term: &str,
        field_names: Option<&[String]>,
        max_records: Option<usize>,
        view: Option<&str>,
    ) -> Result<Vec<Record>, StoreError>;
}
