//! Manifest file parsing.

use factlink_domain::ConnectorEntry;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a connector manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connector id cannot be empty")]
    EmptyConnectorId,

    #[error("Duplicate connector id: {0}")]
    DuplicateConnector(String),

    #[error("Unknown connector '{id}' (available: {available})")]
    UnknownConnector { id: String, available: String },
}

/// The set of connectors one manifest declares
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectorManifest {
    #[serde(default)]
    pub connectors: Vec<ConnectorEntry>,
}

impl ConnectorManifest {
    /// Reject empty and duplicate connector ids.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for entry in &self.connectors {
            if entry.id.trim().is_empty() {
                return Err(ManifestError::EmptyConnectorId);
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(ManifestError::DuplicateConnector(entry.id.clone()));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ConnectorEntry> {
        self.connectors.iter().find(|c| c.id == id)
    }

    /// Like [`get`](Self::get), with an error naming the known ids.
    pub fn require(&self, id: &str) -> Result<&ConnectorEntry, ManifestError> {
        self.get(id).ok_or_else(|| ManifestError::UnknownConnector {
            id: id.to_string(),
            available: self.ids().collect::<Vec<_>>().join(", "),
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.connectors.iter().map(|c| c.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }
}

/// Reads manifests from disk
pub struct ManifestLoader;

impl ManifestLoader {
    /// Load and validate a manifest. `.json` files are parsed as JSON,
    /// everything else as TOML.
    pub fn load(path: &Path) -> Result<ConnectorManifest, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let manifest = if is_json {
            Self::parse_json(&content)?
        } else {
            Self::parse_toml(&content)?
        };

        debug!(
            path = %path.display(),
            connectors = manifest.len(),
            "Loaded connector manifest"
        );
        Ok(manifest)
    }

    pub fn parse_toml(content: &str) -> Result<ConnectorManifest, ManifestError> {
        let manifest: ConnectorManifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn parse_json(content: &str) -> Result<ConnectorManifest, ManifestError> {
        let manifest: ConnectorManifest = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }
}
