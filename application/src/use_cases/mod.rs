//! Use cases (application services)
//!
//! Use cases orchestrate domain logic and coordinate with external systems
//! through ports.

pub mod execute_workflow;
