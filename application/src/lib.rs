//! Application layer for factlink
//!
//! This crate contains the workflow use case, port definitions, application
//! configuration and the call-tracking transport double.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod testing;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    audit_logger::{AuditEvent, AuditLogger, NoAuditLogger},
    local_fallback::{FallbackError, LocalFallbackPort},
    progress::{NoProgress, WorkflowProgressNotifier},
    tool_transport::ToolTransport,
};
pub use testing::{CallTrackingTransport, TrackedCall};
pub use use_cases::execute_workflow::{
    CANCELLED_REASON, ExecuteWorkflowInput, ExecuteWorkflowUseCase, REQUIRES_VECTOR_KEY,
};
