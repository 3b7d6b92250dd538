//! Plan domain entities

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::connector::{ConnectorEntry, RemoteTool, normalize_tool_name, resolve_tools};

/// Parameter key flagging a step whose failure must not abort the workflow
pub const OPTIONAL_KEY: &str = "optional";

/// What a plan step does.
///
/// The labels are a fixed wire vocabulary assigned in step order, so they do
/// not read as role names: `enrich-with-secondary` is the corroboration step
/// and `corroborate-optional` is the optional enrichment step. Use
/// [`PlanAction::role`] or the step's `role` parameter rather than the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanAction {
    /// Discovery: call the primary similarity-search tool
    InvokePrimary,
    /// Corroboration: fetch structured records for discovered identifiers
    EnrichWithSecondary,
    /// Enrichment: advisory structured query, failure is non-fatal
    CorroborateOptional,
    /// No role-tagged tool exists; inspect the connector instead
    InspectCapabilities,
}

impl PlanAction {
    pub fn as_str(&self) -> &str {
        match self {
            PlanAction::InvokePrimary => "invoke-primary",
            PlanAction::EnrichWithSecondary => "enrich-with-secondary",
            PlanAction::CorroborateOptional => "corroborate-optional",
            PlanAction::InspectCapabilities => "inspect-capabilities",
        }
    }

    /// The workflow role served by this action, if any
    pub fn role(&self) -> Option<ToolRole> {
        match self {
            PlanAction::InvokePrimary => Some(ToolRole::Discovery),
            PlanAction::EnrichWithSecondary => Some(ToolRole::Corroboration),
            PlanAction::CorroborateOptional => Some(ToolRole::Enrichment),
            PlanAction::InspectCapabilities => None,
        }
    }
}

impl std::fmt::Display for PlanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role a tool plays in the search → corroborate → enrich pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolRole {
    Discovery,
    Corroboration,
    Enrichment,
}

impl ToolRole {
    /// Pipeline order; plans are always assembled in this order
    pub const ALL: [ToolRole; 3] = [ToolRole::Discovery, ToolRole::Corroboration, ToolRole::Enrichment];

    pub fn as_str(&self) -> &str {
        match self {
            ToolRole::Discovery => "discovery",
            ToolRole::Corroboration => "corroboration",
            ToolRole::Enrichment => "enrichment",
        }
    }

    pub fn action(&self) -> PlanAction {
        match self {
            ToolRole::Discovery => PlanAction::InvokePrimary,
            ToolRole::Corroboration => PlanAction::EnrichWithSecondary,
            ToolRole::Enrichment => PlanAction::CorroborateOptional,
        }
    }

    /// Tags that assign a tool to this role
    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            ToolRole::Discovery => &["vector", "semantic", "embedding"],
            ToolRole::Corroboration => &["claims", "records", "lookup"],
            ToolRole::Enrichment => &["sparql", "query", "graph", "cypher"],
        }
    }

    /// Name fragments that assign a tool to this role when no tag matches
    pub fn name_patterns(&self) -> &'static [&'static str] {
        match self {
            ToolRole::Discovery => &["vector", "search"],
            ToolRole::Corroboration => &["claim", "record", "get_entity"],
            ToolRole::Enrichment => &["sparql", "query", "cypher"],
        }
    }

    /// Whether skipping this role degrades the result
    pub fn is_required(&self) -> bool {
        !matches!(self, ToolRole::Enrichment)
    }

    pub fn matches_tag(&self, tool: &RemoteTool) -> bool {
        self.tags().iter().any(|tag| tool.has_tag(tag))
    }

    pub fn matches_name(&self, tool: &RemoteTool) -> bool {
        let capability = tool.capability().to_ascii_lowercase();
        self.name_patterns().iter().any(|p| capability.contains(p))
    }
}

impl std::fmt::Display for ToolRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single step in an execution plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    pub action: PlanAction,
    pub target_tool: String,
    pub parameters: Map<String, Value>,
    /// 1-based position; strictly increasing with no gaps
    pub order: u32,
}

impl PlanStep {
    pub fn is_optional(&self) -> bool {
        self.parameters
            .get(OPTIONAL_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn role(&self) -> Option<ToolRole> {
        self.action.role()
    }
}

/// An ordered, non-empty sequence of plan steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    steps: Vec<PlanStep>,
}

impl ExecutionPlan {
    /// Wrap steps, rejecting plans that break the ordering invariants.
    pub fn new(steps: Vec<PlanStep>) -> Result<Self, String> {
        if steps.is_empty() {
            return Err("execution plan must contain at least one step".to_string());
        }
        for (i, step) in steps.iter().enumerate() {
            let expected = (i + 1) as u32;
            if step.order != expected {
                return Err(format!(
                    "step '{}' has order {}, expected {}",
                    step.target_tool, step.order, expected
                ));
            }
        }
        Ok(Self { steps })
    }

    /// Wrap steps the planner assembled; ordering is correct by construction.
    pub(crate) fn from_planner(steps: Vec<PlanStep>) -> Self {
        debug_assert!(!steps.is_empty());
        Self { steps }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The step serving `role`, if planned
    pub fn step_for(&self, role: ToolRole) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.role() == Some(role))
    }

    /// True when the plan is the single "inspect capabilities" fallback
    pub fn is_fallback(&self) -> bool {
        self.steps
            .iter()
            .all(|s| s.action == PlanAction::InspectCapabilities)
    }

    pub fn into_steps(self) -> Vec<PlanStep> {
        self.steps
    }
}

/// The view of a connector the planner works from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSurface {
    pub connector_id: String,
    pub scopes: Vec<String>,
    pub remote_tools: Vec<RemoteTool>,
    /// Canonical name → name the connector declared, where they differ
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub upstream_names: BTreeMap<String, String>,
}

impl WorkflowSurface {
    pub fn new(connector_id: impl Into<String>, remote_tools: Vec<RemoteTool>) -> Self {
        Self {
            connector_id: connector_id.into(),
            scopes: Vec::new(),
            remote_tools,
            upstream_names: BTreeMap::new(),
        }
    }

    /// The name to send over the transport for a canonical tool name
    pub fn upstream_name<'a>(&'a self, canonical: &'a str) -> &'a str {
        self.upstream_names
            .get(canonical)
            .map(String::as_str)
            .unwrap_or(canonical)
    }

    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Build a surface from resolved tools with canonical names.
    ///
    /// A tool keeps its declared tags and scopes when normalization finds no
    /// matching resolved tool under its canonical name.
    pub fn from_entry(entry: &ConnectorEntry) -> Self {
        let mut upstream_names = BTreeMap::new();
        let remote_tools = resolve_tools(entry)
            .into_iter()
            .map(|tool| {
                let normalized = normalize_tool_name(&tool.name, &entry.id, entry);
                if normalized.normalized_name != tool.name {
                    upstream_names.insert(normalized.normalized_name.clone(), tool.name.clone());
                }
                let tags = if normalized.tags.is_empty() { tool.tags } else { normalized.tags };
                let scopes = if normalized.scopes.is_empty() { tool.scopes } else { normalized.scopes };
                RemoteTool {
                    name: normalized.normalized_name,
                    description: tool.description,
                    tags,
                    scopes,
                }
            })
            .collect();

        Self {
            connector_id: entry.id.clone(),
            scopes: entry.scopes.clone(),
            remote_tools,
            upstream_names,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(order: u32) -> PlanStep {
        PlanStep {
            action: PlanAction::InvokePrimary,
            target_tool: format!("t{order}"),
            parameters: Map::new(),
            order,
        }
    }

    #[test]
    fn test_action_vocabulary() {
        assert_eq!(PlanAction::InvokePrimary.as_str(), "invoke-primary");
        assert_eq!(
            serde_json::to_value(PlanAction::CorroborateOptional).unwrap(),
            serde_json::json!("corroborate-optional")
        );
        assert_eq!(ToolRole::Enrichment.action(), PlanAction::CorroborateOptional);
        assert_eq!(PlanAction::InspectCapabilities.role(), None);
    }

    #[test]
    fn test_labels_map_to_roles_by_position() {
        assert_eq!(PlanAction::InvokePrimary.role(), Some(ToolRole::Discovery));
        assert_eq!(
            PlanAction::EnrichWithSecondary.role(),
            Some(ToolRole::Corroboration)
        );
        assert_eq!(
            PlanAction::CorroborateOptional.role(),
            Some(ToolRole::Enrichment)
        );
        for role in [ToolRole::Discovery, ToolRole::Corroboration, ToolRole::Enrichment] {
            assert_eq!(role.action().role(), Some(role));
        }
    }

    #[test]
    fn test_only_enrichment_is_optional_role() {
        assert!(ToolRole::Discovery.is_required());
        assert!(ToolRole::Corroboration.is_required());
        assert!(!ToolRole::Enrichment.is_required());
    }

    #[test]
    fn test_execution_plan_rejects_empty_and_gaps() {
        assert!(ExecutionPlan::new(vec![]).is_err());
        assert!(ExecutionPlan::new(vec![step(1), step(3)]).is_err());
        assert!(ExecutionPlan::new(vec![step(2)]).is_err());
        assert_eq!(ExecutionPlan::new(vec![step(1), step(2)]).unwrap().len(), 2);
    }

    #[test]
    fn test_surface_normalizes_upstream_names() {
        let entry = ConnectorEntry::new("wikidata", "Wikidata").with_remote_tools(vec![
            RemoteTool::new("get_claims").with_tags(["claims"]),
            RemoteTool::new("query"),
        ]);

        let surface = WorkflowSurface::from_entry(&entry);
        let names: Vec<_> = surface.remote_tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["wikidata.get_entity_claims", "wikidata.execute_sparql"]);
        assert!(surface.remote_tools[0].has_tag("claims"));
        assert_eq!(surface.upstream_name("wikidata.get_entity_claims"), "get_claims");
        assert_eq!(surface.upstream_name("wikidata.unknown"), "wikidata.unknown");
    }
}
