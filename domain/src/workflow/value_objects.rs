//! Workflow value objects: the output side of an orchestration run.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::error::WorkflowError;

/// Well-known keys in [`WorkflowResult::metadata`]
pub mod metadata_keys {
    pub const PROVENANCE: &str = "provenance";
    pub const CONNECTOR_ID: &str = "connectorId";
    pub const TOOL_SOURCE: &str = "toolSource";
    pub const QUERY_FINGERPRINT: &str = "queryFingerprint";
    pub const DISCOVERY_TOOL: &str = "discoveryTool";
    pub const CANDIDATE_COUNT: &str = "candidateCount";
    pub const ENTITY_ID: &str = "entityId";
    pub const ENTITY_LABEL: &str = "entityLabel";
    pub const CORROBORATION_TOOL: &str = "corroborationTool";
    pub const CLAIM_ID: &str = "claimId";
    pub const CLAIM_COUNT: &str = "claimCount";
    pub const ATTRIBUTES: &str = "attributes";
    pub const ENRICHMENT_TOOL: &str = "enrichmentTool";
    pub const ENRICHMENT_QUERY: &str = "enrichmentQuery";
    pub const ENRICHMENT_RESULT_COUNT: &str = "enrichmentResultCount";
    pub const ENRICHMENT_ERROR: &str = "enrichmentError";
    pub const STEPS_EXECUTED: &str = "stepsExecuted";
    pub const SKIPPED_STEPS: &str = "skippedSteps";
    pub const FALLBACK_REASON: &str = "fallbackReason";
    pub const FALLBACK_RESULT_COUNT: &str = "fallbackResultCount";
}

/// One hit returned by the local fallback store, in the store's own order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SearchHit {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            content: content.into(),
            score: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Where a ranked item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultSource {
    Remote,
    LocalFallback,
}

/// A result item with its explicit 1-based rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    pub position: usize,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub source: ResultSource,
}

impl RankedItem {
    /// Rank local hits in exactly the order the store returned them.
    pub fn from_local_hits(hits: Vec<SearchHit>) -> Vec<RankedItem> {
        hits.into_iter()
            .enumerate()
            .map(|(i, hit)| RankedItem {
                position: i + 1,
                id: hit.id,
                title: hit.title,
                content: hit.content,
                score: hit.score,
                source: ResultSource::LocalFallback,
            })
            .collect()
    }
}

/// Output of an orchestration run.
///
/// `metadata` is an ordered map so two runs over identical inputs serialize
/// byte-for-byte identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    /// Retrieved text / fact payload
    pub content: String,
    /// Ranked items backing the content
    #[serde(default)]
    pub results: Vec<RankedItem>,
    /// Accumulated per-step provenance
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    /// Original ordering survived a fallback
    pub rank_preserved: bool,
    /// A required step was skipped or substituted
    pub degraded: bool,
    /// User-visible explanation (configuration errors only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WorkflowError>,
}

impl WorkflowResult {
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.metadata_str(metadata_keys::ENTITY_ID)
    }

    pub fn claim_id(&self) -> Option<&str> {
        self.metadata_str(metadata_keys::CLAIM_ID)
    }

    pub fn enrichment_query(&self) -> Option<&str> {
        self.metadata_str(metadata_keys::ENRICHMENT_QUERY)
    }

    pub fn is_fallback(&self) -> bool {
        self.metadata.contains_key(metadata_keys::FALLBACK_REASON)
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty() && self.content.is_empty()
    }
}
