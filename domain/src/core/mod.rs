//! Core domain concepts shared across all subdomains.
//!
//! - [`brand`]: provenance tag and reserved tool identifiers
//! - [`error::WorkflowError`]: error taxonomy for degraded and failed lookups
//! - [`string`]: small text helpers

pub mod brand;
pub mod error;
pub mod string;
