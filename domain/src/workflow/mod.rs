//! Workflow domain module
//!
//! Value types and pure helpers used by the orchestration executor:
//!
//! - [`WorkflowPhase`]: the per-invocation state machine
//! - [`WorkflowResult`]: provenance-annotated output
//! - [`extract`]: readers for the documented fields of transport responses
//! - [`enrichment`]: contextual structured queries built from a discovered entity
//! - [`embedding`]: deterministic placeholder vectors and query fingerprints
//!
//! ```text
//! ROUTING ─▶ DISCOVERY ─▶ CORROBORATION ─▶ [ENRICHMENT] ─▶ STITCHING ─▶ DONE
//!    │           │              │
//!    └───────────┴──────────────┴──────────▶ FALLBACK
//! ```

pub mod embedding;
pub mod enrichment;
pub mod extract;
pub mod phase;
pub mod value_objects;

pub use embedding::{deterministic_embedding, query_fingerprint};
pub use enrichment::QueryLanguage;
pub use extract::{Candidate, Claim};
pub use phase::WorkflowPhase;
pub use value_objects::{
    RankedItem, ResultSource, SearchHit, WorkflowResult, metadata_keys,
};
