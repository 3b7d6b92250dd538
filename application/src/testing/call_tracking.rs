//! Call-tracking transport double.
//!
//! Records every call twice: on the **queue** when the call arrives, and on
//! the **history** once it resolves, with timing and outcome. Outcomes are
//! scripted per tool name with [`CallTrackingTransport::mock_tool_response`]
//! and [`CallTrackingTransport::mock_tool_error`]. An unscripted call gets a
//! labeled "no mock configured" response instead of an error.
//!
//! One instance per test scenario; the interior mutex only makes it usable
//! behind an `Arc`, it does not make shared scenarios meaningful.

use crate::ports::tool_transport::ToolTransport;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use factlink_domain::tool::TransportError;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Label carried by responses to unscripted tools
pub const NO_MOCK_CONFIGURED: &str = "no mock configured";

/// One recorded call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedCall {
    pub name: String,
    pub args: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
    /// Set once the call has resolved (history entries only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TrackedCall {
    fn pending(name: &str, args: &Map<String, Value>) -> Self {
        Self {
            name: name.to_string(),
            args: args.clone(),
            timestamp: Utc::now(),
            duration_ms: None,
            success: None,
            result: None,
            error_message: None,
        }
    }

    /// True once the call has an outcome recorded
    pub fn is_resolved(&self) -> bool {
        self.success.is_some()
    }
}

#[derive(Debug, Clone)]
enum ScriptedOutcome {
    Response(Value),
    Error(TransportError),
}

#[derive(Default)]
struct TrackingState {
    mocks: HashMap<String, ScriptedOutcome>,
    queue: Vec<TrackedCall>,
    history: Vec<TrackedCall>,
}

/// Transport double that records calls and replays scripted outcomes
#[derive(Default)]
pub struct CallTrackingTransport {
    state: Mutex<TrackingState>,
}

impl CallTrackingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, TrackingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Scripting ====================

    /// Every later call to `name` succeeds with `response`.
    pub fn mock_tool_response(&self, name: impl Into<String>, response: Value) {
        self.state()
            .mocks
            .insert(name.into(), ScriptedOutcome::Response(response));
    }

    /// Every later call to `name` fails with `error`.
    pub fn mock_tool_error(&self, name: impl Into<String>, error: TransportError) {
        self.state()
            .mocks
            .insert(name.into(), ScriptedOutcome::Error(error));
    }

    // ==================== Inspection ====================

    pub fn was_tool_called(&self, name: &str) -> bool {
        self.state().queue.iter().any(|c| c.name == name)
    }

    pub fn tool_call_count(&self, name: &str) -> usize {
        self.state().queue.iter().filter(|c| c.name == name).count()
    }

    pub fn last_call_args(&self, name: &str) -> Option<Map<String, Value>> {
        self.state()
            .queue
            .iter()
            .rev()
            .find(|c| c.name == name)
            .map(|c| c.args.clone())
    }

    /// Resolved calls, oldest first
    pub fn call_history(&self) -> Vec<TrackedCall> {
        self.state().history.clone()
    }

    /// Calls in arrival order
    pub fn call_queue(&self) -> Vec<TrackedCall> {
        self.state().queue.clone()
    }

    pub fn clear_queue(&self) {
        self.state().queue.clear();
    }

    pub fn clear_history(&self) {
        self.state().history.clear();
    }
}

#[async_trait]
impl ToolTransport for CallTrackingTransport {
    async fn call_tool(
        &self,
        name: &str,
        args: &Map<String, Value>,
    ) -> Result<Value, TransportError> {
        let started = Instant::now();
        let mut call = TrackedCall::pending(name, args);

        let outcome = {
            let mut state = self.state();
            state.queue.push(call.clone());
            match state.mocks.get(name) {
                Some(ScriptedOutcome::Response(value)) => Ok(value.clone()),
                Some(ScriptedOutcome::Error(error)) => Err(error.clone()),
                None => Ok(json!({
                    "mocked": false,
                    "tool": name,
                    "message": format!("{}: {}", NO_MOCK_CONFIGURED, name),
                })),
            }
        };

        call.duration_ms = Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));
        call.success = Some(outcome.is_ok());
        match &outcome {
            Ok(value) => call.result = Some(value.clone()),
            Err(error) => call.error_message = Some(error.to_string()),
        }
        self.state().history.push(call);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_error_recorded_in_history() {
        let transport = CallTrackingTransport::new();
        transport.mock_tool_error(
            "discovery_tool",
            TransportError::network("connection reset by peer"),
        );

        let outcome = transport.call_tool("discovery_tool", &Map::new()).await;
        assert!(outcome.is_err());

        let history = transport.call_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "discovery_tool");
        assert_eq!(history[0].success, Some(false));
        assert!(
            history[0]
                .error_message
                .as_deref()
                .unwrap()
                .contains("connection reset by peer")
        );
        assert!(history[0].duration_ms.is_some());
    }

    #[tokio::test]
    async fn test_scripted_response_is_returned() {
        let transport = CallTrackingTransport::new();
        transport.mock_tool_response("lookup", json!({"results": [{"id": "Q1"}]}));

        let value = transport.call_tool("lookup", &Map::new()).await.unwrap();

        assert_eq!(value["results"][0]["id"], "Q1");
        assert_eq!(transport.call_history()[0].success, Some(true));
    }

    #[tokio::test]
    async fn test_unmocked_call_is_labeled() {
        let transport = CallTrackingTransport::new();

        let value = transport.call_tool("mystery", &Map::new()).await.unwrap();

        assert_eq!(value["mocked"], false);
        assert!(value["message"].as_str().unwrap().starts_with(NO_MOCK_CONFIGURED));
    }

    #[tokio::test]
    async fn test_counts_and_last_args() {
        let transport = CallTrackingTransport::new();
        let mut first = Map::new();
        first.insert("q".into(), "one".into());
        let mut second = Map::new();
        second.insert("q".into(), "two".into());

        transport.call_tool("search", &first).await.unwrap();
        transport.call_tool("search", &second).await.unwrap();
        transport.call_tool("other", &Map::new()).await.unwrap();

        assert!(transport.was_tool_called("search"));
        assert!(!transport.was_tool_called("never"));
        assert_eq!(transport.tool_call_count("search"), 2);
        assert_eq!(transport.last_call_args("search").unwrap()["q"], "two");
        assert!(transport.last_call_args("never").is_none());
    }

    #[tokio::test]
    async fn test_queue_and_history_clear_independently() {
        let transport = CallTrackingTransport::new();
        transport.call_tool("a", &Map::new()).await.unwrap();
        transport.call_tool("b", &Map::new()).await.unwrap();

        transport.clear_queue();
        assert!(transport.call_queue().is_empty());
        assert_eq!(transport.call_history().len(), 2);
        assert!(!transport.was_tool_called("a"));

        transport.call_tool("c", &Map::new()).await.unwrap();
        transport.clear_history();
        assert!(transport.call_history().is_empty());
        assert_eq!(transport.call_queue().len(), 1);
    }

    #[tokio::test]
    async fn test_queue_entries_are_unresolved_snapshots() {
        let transport = CallTrackingTransport::new();
        transport.call_tool("a", &Map::new()).await.unwrap();

        assert!(!transport.call_queue()[0].is_resolved());
        assert!(transport.call_history()[0].is_resolved());
    }

    #[tokio::test]
    async fn test_remock_replaces_outcome() {
        let transport = CallTrackingTransport::new();
        transport.mock_tool_error("t", TransportError::network("down"));
        transport.mock_tool_response("t", json!({"ok": true}));

        assert!(transport.call_tool("t", &Map::new()).await.is_ok());
    }
}
