//! Connector manifest loading
//!
//! A manifest lists the connectors available to the CLI. TOML and JSON
//! are both accepted; the file extension decides which parser runs.
//!
//! ```toml
//! [[connectors]]
//! id = "acme"
//! displayName = "Acme Facts"
//!
//! [[connectors.remoteTools]]
//! name = "acme.vector_search_items"
//! description = "Semantic item search"
//! tags = ["vector"]
//! ```

mod loader;

pub use loader::{ConnectorManifest, ManifestError, ManifestLoader};
