//! File locations from TOML (`[manifest]`, `[fallback]`, `[audit]` sections)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of hits returned by the local fallback store
pub const DEFAULT_FALLBACK_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileManifestConfig {
    /// Connector manifest (TOML or JSON)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFallbackConfig {
    /// JSON document store consulted when remote tools fail
    pub path: Option<PathBuf>,
    /// Maximum hits returned
    pub limit: usize,
}

impl Default for FileFallbackConfig {
    fn default() -> Self {
        Self {
            path: None,
            limit: DEFAULT_FALLBACK_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuditConfig {
    /// JSONL audit log; disabled when unset
    pub path: Option<PathBuf>,
}
