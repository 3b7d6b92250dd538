//! Local fallback port
//!
//! A local search capability consulted when remote tools are unusable.
//! Hits must come back in rank order; the executor never reorders them.

use async_trait::async_trait;
use factlink_domain::workflow::SearchHit;
use thiserror::Error;

/// Errors raised by a local fallback store
#[derive(Error, Debug)]
pub enum FallbackError {
    #[error("Local store unavailable: {0}")]
    Unavailable(String),

    #[error("Local search failed: {0}")]
    SearchFailed(String),
}

/// Port for local (offline) search
#[async_trait]
pub trait LocalFallbackPort: Send + Sync {
    /// Search the local store. Results are ordered best-first.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, FallbackError>;
}
