//! Fixture-file transport for offline runs.
//!
//! The fixture file maps tool names to a scripted outcome:
//!
//! ```json
//! {
//!   "acme.vector_search_items": { "response": { "results": [{ "id": "Q1" }] } },
//!   "acme.execute_sparql": { "error": "endpoint down", "kind": "network", "delayMs": 50 }
//! }
//! ```
//!
//! Unlike the call-tracking double, an unscripted tool is a remote rejection,
//! so a CLI run against incomplete fixtures degrades the way a real server would.

use async_trait::async_trait;
use factlink_application::ToolTransport;
use factlink_domain::{TransportError, TransportErrorKind};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a fixture file
#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixtures {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixture file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Fixture for '{0}' must set exactly one of 'response' or 'error'")]
    Ambiguous(String),
}

/// One scripted outcome
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolFixture {
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    /// Error classification; remote rejection when omitted
    #[serde(default)]
    pub kind: Option<TransportErrorKind>,
    /// Simulated latency before the outcome is returned
    #[serde(default)]
    pub delay_ms: Option<u64>,
}

/// [`ToolTransport`] replaying outcomes from a fixture map
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    fixtures: BTreeMap<String, ToolFixture>,
}

impl ScriptedTransport {
    pub fn new(fixtures: BTreeMap<String, ToolFixture>) -> Result<Self, FixtureError> {
        for (name, fixture) in &fixtures {
            if fixture.response.is_some() == fixture.error.is_some() {
                return Err(FixtureError::Ambiguous(name.clone()));
            }
        }
        Ok(Self { fixtures })
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, FixtureError> {
        let fixtures: BTreeMap<String, ToolFixture> = serde_json::from_str(content)?;
        Self::new(fixtures)
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.fixtures.keys().map(String::as_str)
    }
}

#[async_trait]
impl ToolTransport for ScriptedTransport {
    async fn call_tool(
        &self,
        name: &str,
        _args: &Map<String, Value>,
    ) -> Result<Value, TransportError> {
        let Some(fixture) = self.fixtures.get(name) else {
            return Err(TransportError::remote_rejection(format!(
                "no fixture for tool '{}'",
                name
            )));
        };

        if let Some(delay) = fixture.delay_ms {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        debug!(tool = name, "Replaying fixture");
        match (&fixture.response, &fixture.error) {
            (Some(response), _) => Ok(response.clone()),
            (None, Some(message)) => Err(TransportError::new(
                fixture.kind.unwrap_or(TransportErrorKind::RemoteRejection),
                message.clone(),
            )),
            (None, None) => Err(TransportError::remote_rejection(format!(
                "empty fixture for tool '{}'",
                name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURES: &str = r#"{
        "acme.vector_search_items": {"response": {"results": [{"id": "Q1"}]}},
        "acme.get_entity_claims": {"error": "connection reset", "kind": "network"},
        "acme.execute_sparql": {"error": "bad query"}
    }"#;

    #[tokio::test]
    async fn test_replays_response() {
        let transport = ScriptedTransport::parse(FIXTURES).unwrap();
        let value = transport
            .call_tool("acme.vector_search_items", &Map::new())
            .await
            .unwrap();
        assert_eq!(value["results"][0]["id"], "Q1");
    }

    #[tokio::test]
    async fn test_replays_error_with_kind() {
        let transport = ScriptedTransport::parse(FIXTURES).unwrap();

        let err = transport
            .call_tool("acme.get_entity_claims", &Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Network);

        let err = transport
            .call_tool("acme.execute_sparql", &Map::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::RemoteRejection);
        assert_eq!(err.message, "bad query");
    }

    #[tokio::test]
    async fn test_unscripted_tool_is_rejected() {
        let transport = ScriptedTransport::parse(FIXTURES).unwrap();
        let err = transport.call_tool("other", &Map::new()).await.unwrap_err();
        assert!(err.message.contains("no fixture"));
    }

    #[test]
    fn test_fixture_with_both_outcomes_rejected() {
        let err = ScriptedTransport::parse(r#"{"t": {"response": 1, "error": "x"}}"#).unwrap_err();
        assert!(matches!(err, FixtureError::Ambiguous(name) if name == "t"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.json");
        std::fs::write(&path, FIXTURES).unwrap();

        let transport = ScriptedTransport::load(&path).unwrap();
        assert_eq!(transport.tool_names().count(), 3);
    }
}
