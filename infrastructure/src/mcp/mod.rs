//! MCP stdio transport
//!
//! A lightweight JSON-RPC 2.0 client speaking the Model Context Protocol to
//! a child process over stdin/stdout, newline-delimited.
//!
//! # Lifecycle
//!
//! 1. Spawn the server command with piped stdio
//! 2. `initialize` request, then the `notifications/initialized` notification
//! 3. `tools/list` and `tools/call` requests, one at a time
//!
//! The child is killed when the transport is dropped.

pub mod client;
pub mod error;
pub mod protocol;

pub use client::McpStdioTransport;
pub use error::McpError;
pub use protocol::{McpCallToolResult, McpContent, McpToolInfo};
