//! Transport configuration from TOML (`[transport]` section)
//!
//! Either an MCP server command or a fixture file, never both:
//!
//! ```toml
//! [transport]
//! command = "npx"
//! args = ["-y", "@acme/facts-mcp"]
//! ```

use super::ConfigValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Raw transport configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTransportConfig {
    /// MCP server executable (stdio)
    pub command: Option<String>,
    /// Arguments for `command`
    pub args: Vec<String>,
    /// Extra environment for `command`
    pub env: BTreeMap<String, String>,
    /// Scripted fixture file for offline runs
    pub fixtures: Option<PathBuf>,
}

/// Which transport adapter the configuration asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSelection {
    Mcp {
        command: String,
        args: Vec<String>,
        env: BTreeMap<String, String>,
    },
    Scripted(PathBuf),
    Unconfigured,
}

impl FileTransportConfig {
    pub fn selection(&self) -> Result<TransportSelection, ConfigValidationError> {
        match (&self.command, &self.fixtures) {
            (Some(_), Some(_)) => Err(ConfigValidationError::AmbiguousTransport),
            (Some(command), None) if command.trim().is_empty() => {
                Err(ConfigValidationError::EmptyCommand)
            }
            (Some(command), None) => Ok(TransportSelection::Mcp {
                command: command.clone(),
                args: self.args.clone(),
                env: self.env.clone(),
            }),
            (None, Some(path)) => Ok(TransportSelection::Scripted(path.clone())),
            (None, None) => Ok(TransportSelection::Unconfigured),
        }
    }
}
