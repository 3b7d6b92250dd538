//! Port for structured audit logging.
//!
//! Defines the [`AuditLogger`] trait for recording workflow events
//! (routing decisions, tool calls, fallbacks, final results) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! call transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured audit event.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. Timestamps are added by the adapter.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Event type identifier (e.g., "route_decided", "tool_call", "fallback").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging audit events to a structured log.
///
/// The `log` method is synchronous and non-fallible; logging failures must
/// not disrupt the workflow.
pub trait AuditLogger: Send + Sync {
    /// Record an audit event.
    fn log(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLogger;

impl AuditLogger for NoAuditLogger {
    fn log(&self, _event: AuditEvent) {}
}
