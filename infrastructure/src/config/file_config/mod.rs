//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to application types on demand.

mod execution;
mod routing;
mod storage;
mod transport;

pub use execution::FileExecutionConfig;
pub use routing::FileRoutingConfig;
pub use storage::{FileAuditConfig, FileFallbackConfig, FileManifestConfig};
pub use transport::{FileTransportConfig, TransportSelection};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("execution.timeout_ms cannot be 0")]
    InvalidTimeout,

    #[error("routing.default_scope: unknown scope '{0}' (expected 'facts' or 'properties')")]
    UnknownScope(String),

    #[error("transport.command cannot be empty")]
    EmptyCommand,

    #[error("transport: set either 'command' or 'fixtures', not both")]
    AmbiguousTransport,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Per-call timeout and enrichment switch
    pub execution: FileExecutionConfig,
    /// Default routing options
    pub routing: FileRoutingConfig,
    /// Connector manifest location
    pub manifest: FileManifestConfig,
    /// Local fallback store
    pub fallback: FileFallbackConfig,
    /// JSONL audit trail
    pub audit: FileAuditConfig,
    /// Tool transport selection
    pub transport: FileTransportConfig,
}

impl FileConfig {
    /// Validate the configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.execution.timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        self.routing.to_route_options()?;
        self.transport.selection()?;

        Ok(())
    }
}
