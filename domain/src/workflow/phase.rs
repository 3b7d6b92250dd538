//! Orchestration phases

use serde::{Deserialize, Serialize};

/// State of a single workflow invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    /// Choosing the discovery tool
    Routing,
    /// Similarity search for candidate entities
    Discovery,
    /// Structured records for the discovered entity
    Corroboration,
    /// Advisory structured query
    Enrichment,
    /// Merging per-step metadata into the result
    Stitching,
    Done,
    /// Remote path abandoned; local store consulted
    Fallback,
}

impl WorkflowPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPhase::Routing => "routing",
            WorkflowPhase::Discovery => "discovery",
            WorkflowPhase::Corroboration => "corroboration",
            WorkflowPhase::Enrichment => "enrichment",
            WorkflowPhase::Stitching => "stitching",
            WorkflowPhase::Done => "done",
            WorkflowPhase::Fallback => "fallback",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            WorkflowPhase::Routing => "Routing",
            WorkflowPhase::Discovery => "Discovery",
            WorkflowPhase::Corroboration => "Corroboration",
            WorkflowPhase::Enrichment => "Enrichment",
            WorkflowPhase::Stitching => "Stitching",
            WorkflowPhase::Done => "Done",
            WorkflowPhase::Fallback => "Fallback",
        }
    }

    /// Phases that issue a remote call
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            WorkflowPhase::Discovery | WorkflowPhase::Corroboration | WorkflowPhase::Enrichment
        )
    }

    /// Whether a transport failure in this phase sends the workflow to FALLBACK
    pub fn falls_back_on_failure(&self) -> bool {
        matches!(self, WorkflowPhase::Discovery | WorkflowPhase::Corroboration)
    }
}

impl std::fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
