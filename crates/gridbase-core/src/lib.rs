//! # gridbase-core
//!
//! Shared foundation for the Gridbase MCP server: the tabular data model
//! (bases, tables, fields, records), the [`RecordStore`] contract that the
//! HTTP client implements and the MCP layer consumes, field-value
//! stringification for search snippets, and process-wide configuration.

pub mod config;
pub mod error;
pub mod model;
pub mod store;
pub mod value;

pub use config::ServiceConfig;
pub use error::{ConfigError, StoreError};
pub use model::{
    is_text_field_type, Base, DeletedRecord, Field, FieldSpec, ListRecordsOptions, Record,
    RecordPatch, Table, View, TEXT_FIELD_TYPES,
};
pub use store::RecordStore;
pub use value::stringify_field_value;
