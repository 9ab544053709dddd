//! Error types shared across the Gridbase crates.

use thiserror::Error;

/// Errors surfaced by a [`crate::RecordStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend answered with a non-2xx status. The body has the
    /// credential redacted before it is surfaced anywhere.
    #[error("record store request failed ({status} {status_text}): {body}")]
    Api {
        status: u16,
        status_text: String,
        body: String,
    },

    /// The request never produced a usable response (connection, TLS, ...).
    #[error("record store transport error: {0}")]
    Transport(String),

    /// The response was valid JSON but did not match the expected shape.
    #[error("unexpected record store response shape: {0}")]
    UnexpectedShape(String),

    /// A search named fields that are missing or not text-searchable.
    #[error("invalid fields requested for search: {0}")]
    InvalidSearchFields(String),

    /// A referenced base, table, or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Errors raised while reading startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The credential is required; without it the service must not start.
    #[error("GRIDBASE_API_KEY is not set; the record store credential is required")]
    MissingApiKey,

    /// A numeric limit variable did not parse.
    #[error("invalid value for {var}: {value}")]
    InvalidLimit { var: String, value: String },
}
