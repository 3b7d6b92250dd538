//! Transport error value object
//!
//! | Kind | Raised when |
//! |------|-------------|
//! | `Network` | the transport could not reach the remote side |
//! | `Timeout` | the caller-supplied deadline elapsed |
//! | `RemoteRejection` | the remote side answered with an error |
//! | `Cancelled` | the caller's cancellation signal fired between steps |
//!
//! Every kind is treated the same way by the executor: a required step
//! failing for any reason sends the workflow to its fallback path.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    Network,
    Timeout,
    RemoteRejection,
    Cancelled,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &str {
        match self {
            TransportErrorKind::Network => "network",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::RemoteRejection => "remote_rejection",
            TransportErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised by a tool transport
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("[{kind}] {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Network, message)
    }

    pub fn remote_rejection(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::RemoteRejection, message)
    }

    pub fn timeout(tool: &str, timeout_ms: u64) -> Self {
        Self::new(
            TransportErrorKind::Timeout,
            format!("call to '{}' timed out after {}ms", tool, timeout_ms),
        )
    }

    pub fn cancelled() -> Self {
        Self::new(TransportErrorKind::Cancelled, "workflow cancelled by caller")
    }
}
