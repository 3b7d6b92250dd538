//! Error types for the MCP adapter

use factlink_domain::TransportError;
use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur when communicating with an MCP server
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Failed to spawn MCP server '{server}': {source}")]
    SpawnError {
        server: String,
        #[source]
        source: std::io::Error,
    },

    #[error("MCP server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("JSON-RPC error (code {code}): {message}")]
    RpcError { code: i64, message: String },

    #[error("Failed to capture MCP server {0}")]
    MissingPipe(&'static str),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Tool reported an error: {0}")]
    ToolError(String),
}

impl From<McpError> for TransportError {
    fn from(err: McpError) -> Self {
        match err {
            McpError::RpcError { .. } | McpError::ToolError(_) => {
                TransportError::remote_rejection(err.to_string())
            }
            other => TransportError::network(other.to_string()),
        }
    }
}
