//! Domain error taxonomy
//!
//! Only [`WorkflowErrorKind::Configuration`] is ever surfaced to callers as a
//! failure signal. Every other kind is absorbed into a degraded
//! [`WorkflowResult`](crate::workflow::WorkflowResult) so callers can inspect
//! quality without handling errors for expected degradation paths.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of everything that can go wrong during a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowErrorKind {
    /// Malformed tool declaration, recovered by skipping the entry
    Validation,
    /// No tools available; a sentinel route, not a failure
    RoutingFallback,
    /// Network failure, timeout or remote rejection during a required step
    Transport,
    /// Enrichment step failure, logged and skipped
    AdvisoryStepFailure,
    /// Remote path failed and no local fallback could answer
    Configuration,
}

impl WorkflowErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            WorkflowErrorKind::Validation => "validation",
            WorkflowErrorKind::RoutingFallback => "routing_fallback",
            WorkflowErrorKind::Transport => "transport",
            WorkflowErrorKind::AdvisoryStepFailure => "advisory_step_failure",
            WorkflowErrorKind::Configuration => "configuration",
        }
    }

    /// Whether this kind reaches the caller as a user-visible failure.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, WorkflowErrorKind::Configuration)
    }
}

impl std::fmt::Display for WorkflowErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error explanation attached to a workflow result.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct WorkflowError {
    pub kind: WorkflowErrorKind,
    pub message: String,
}

impl WorkflowError {
    pub fn new(kind: WorkflowErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(WorkflowErrorKind::Configuration, message)
    }

    pub fn is_configuration(&self) -> bool {
        self.kind == WorkflowErrorKind::Configuration
    }
}
