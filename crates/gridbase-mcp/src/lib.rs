//! MCP (Model Context Protocol) server over a remote tabular record store.
//!
//! Exposes the store's bases, tables, fields, and records as MCP tools and
//! resources: a full CRUD/schema tool surface or a minimal `search`/`fetch`
//! pair, selected at startup. Search is synthesized client-side by walking
//! the store table by table; there is no server-side index.

pub mod error;
pub mod executor;
pub mod http_transport;
pub mod normalize;
pub mod protocol;
pub mod resources;
pub mod search;
pub mod server;
pub mod tools;

pub use error::McpError;
pub use executor::ToolExecutor;
pub use normalize::{table_to_json, DetailLevel};
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ResourceDescriptor,
    ToolContent, ToolDefinition,
};
pub use resources::ResourceCatalog;
pub use search::{FetchResultItem, SearchResultItem, Searcher};
pub use server::McpServer;
pub use tools::{ToolProfile, ToolRegistry};
