//! # gridbase-client
//!
//! HTTP implementation of the [`gridbase_core::RecordStore`] contract:
//! bearer-authenticated JSON calls against the record store, transparent
//! pagination, response-shape validation, credential redaction, and the
//! free-text search formula builder.

pub mod client;
pub mod formula;

pub use client::HttpRecordStore;
