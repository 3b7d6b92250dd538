//! Progress notification port
//!
//! Defines the interface for reporting progress while a workflow runs.

use factlink_domain::workflow::WorkflowPhase;

/// Callback for progress updates during workflow execution
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain stderr lines, nothing).
pub trait WorkflowProgressNotifier: Send + Sync {
    /// Called when a phase starts. `tool` is the remote tool about to be invoked, if any.
    fn on_phase_start(&self, phase: WorkflowPhase, tool: Option<&str>);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: WorkflowPhase, success: bool);

    /// Called when a planned step does not run
    fn on_step_skipped(&self, _phase: WorkflowPhase, _reason: &str) {}

    /// Called when the workflow abandons the remote path
    fn on_fallback(&self, _reason: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl WorkflowProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: WorkflowPhase, _tool: Option<&str>) {}
    fn on_phase_complete(&self, _phase: WorkflowPhase, _success: bool) {}
}
