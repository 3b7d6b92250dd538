//! Infrastructure layer for factlink
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, plus configuration and manifest loading.

pub mod config;
pub mod fallback;
pub mod logging;
pub mod manifest;
pub mod mcp;
pub mod transport;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileTransportConfig, TransportSelection,
};
pub use fallback::{FallbackDocument, JsonFallbackStore};
pub use logging::JsonlAuditLogger;
pub use manifest::{ConnectorManifest, ManifestError, ManifestLoader};
pub use mcp::{McpError, McpStdioTransport};
pub use transport::{FixtureError, ScriptedTransport};
