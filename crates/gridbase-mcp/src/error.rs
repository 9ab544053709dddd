//! Error types for the MCP crate.

use gridbase_core::StoreError;
use thiserror::Error;

/// Errors that can occur in the MCP server.
///
/// All of these are caught at the dispatch boundary and converted into an
/// `isError: true` envelope; only transport/startup variants ever reach
/// the binary.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Tool not found.
    #[error("Unknown tool: {name}")]
    ToolNotFound { name: String },

    /// Invalid arguments for a tool.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// A fetch id that does not split into base:table:record.
    #[error("invalid id format '{0}': expected \"<baseId>:<tableId>:<recordId>\"")]
    InvalidFetchId(String),

    /// A resource URI that does not parse or resolve.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// Backend failure, already credential-redacted by the client.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
