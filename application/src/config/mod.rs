//! Application-level configuration.
//!
//! Configuration types that control how the orchestration use case behaves,
//! such as per-call timeouts and whether optional enrichment runs.

pub mod execution_params;

pub use execution_params::ExecutionParams;
