//! Configuration file loading for factlink
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `FACTLINK_*` environment variables (`FACTLINK_EXECUTION__TIMEOUT_MS=500`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./factlink.toml` or `./.factlink.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/factlink/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAuditConfig, FileConfig, FileExecutionConfig, FileFallbackConfig,
    FileManifestConfig, FileRoutingConfig, FileTransportConfig, TransportSelection,
};
pub use loader::ConfigLoader;
