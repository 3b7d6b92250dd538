//! Logging infrastructure: structured audit logging.
//!
//! Provides [`JsonlAuditLogger`], a JSONL file writer that implements
//! the [`AuditLogger`](factlink_application::AuditLogger) port.

mod jsonl_audit;

pub use jsonl_audit::JsonlAuditLogger;
