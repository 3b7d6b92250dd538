//! Execution parameters for the orchestration workflow.
//!
//! [`ExecutionParams`] groups the static parameters that control a single
//! run of [`ExecuteWorkflowUseCase`](crate::use_cases::execute_workflow::ExecuteWorkflowUseCase).
//! These are application-layer concerns, not domain policy.

use factlink_domain::workflow::embedding::DEFAULT_PLACEHOLDER_DIMENSIONS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout applied to every remote tool call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Workflow execution control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Timeout applied to each remote tool call.
    pub timeout: Duration,
    /// Whether the optional enrichment step is attempted.
    pub enable_enrichment: bool,
    /// Vector length used when a connector asks for a placeholder query vector
    /// and neither the route nor the connector metadata names a dimension.
    pub placeholder_dimensions: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            enable_enrichment: true,
            placeholder_dimensions: DEFAULT_PLACEHOLDER_DIMENSIONS,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_timeout_ms(self, timeout_ms: u64) -> Self {
        self.with_timeout(Duration::from_millis(timeout_ms))
    }

    pub fn with_enrichment(mut self, enabled: bool) -> Self {
        self.enable_enrichment = enabled;
        self
    }

    pub fn with_placeholder_dimensions(mut self, dimensions: usize) -> Self {
        self.placeholder_dimensions = dimensions;
        self
    }

    /// Timeout in whole milliseconds, for logging and error messages.
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}
