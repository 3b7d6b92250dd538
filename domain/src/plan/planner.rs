//! Workflow Planner
//!
//! Role assignment is tag-first: for each role in pipeline order, the first
//! unassigned tool (in declared order) carrying one of the role's tags wins.
//! Only when no tool carries such a tag does name-pattern matching apply.
//! A tool fills at most one role.

use serde_json::{Map, Value};

use super::entities::{
    ExecutionPlan, OPTIONAL_KEY, PlanAction, PlanStep, ToolRole, WorkflowSurface,
};
use crate::connector::RemoteTool;
use crate::core::brand::{BRAND_TAG, CONNECTOR_KEY, INSPECT_CAPABILITIES_TOOL, PROVENANCE_KEY};
use crate::workflow::enrichment::QueryLanguage;

/// Fallback reason recorded on the inspect-capabilities step
pub const NO_ROLE_TOOLS_REASON: &str = "no-role-tagged-tools";

/// Pick at most one tool per role, in pipeline order.
pub fn assign_roles(tools: &[RemoteTool]) -> Vec<(ToolRole, &RemoteTool)> {
    let mut taken = vec![false; tools.len()];
    let mut assigned = Vec::new();

    for role in ToolRole::ALL {
        let pick = first_unassigned(tools, &taken, |t| role.matches_tag(t))
            .or_else(|| first_unassigned(tools, &taken, |t| role.matches_name(t)));

        if let Some(index) = pick {
            taken[index] = true;
            assigned.push((role, &tools[index]));
        }
    }

    assigned
}

fn first_unassigned(
    tools: &[RemoteTool],
    taken: &[bool],
    predicate: impl Fn(&RemoteTool) -> bool,
) -> Option<usize> {
    tools
        .iter()
        .enumerate()
        .find(|(i, t)| !taken[*i] && predicate(*t))
        .map(|(i, _)| i)
}

/// Build the ordered step list for a query. Never returns an empty list.
pub fn build_plan(query: &str, surface: &WorkflowSurface) -> Vec<PlanStep> {
    let assigned = assign_roles(&surface.remote_tools);

    if assigned.is_empty() {
        return vec![inspect_capabilities_step(query, surface)];
    }

    assigned
        .into_iter()
        .enumerate()
        .map(|(i, (role, tool))| PlanStep {
            action: role.action(),
            target_tool: tool.name.clone(),
            parameters: step_parameters(query, surface, role, tool),
            order: (i + 1) as u32,
        })
        .collect()
}

/// [`build_plan`] wrapped in an [`ExecutionPlan`].
pub fn build_execution_plan(query: &str, surface: &WorkflowSurface) -> ExecutionPlan {
    ExecutionPlan::from_planner(build_plan(query, surface))
}

fn base_parameters(surface: &WorkflowSurface) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert(PROVENANCE_KEY.into(), BRAND_TAG.into());
    params.insert(CONNECTOR_KEY.into(), surface.connector_id.clone().into());
    params
}

fn step_parameters(
    query: &str,
    surface: &WorkflowSurface,
    role: ToolRole,
    tool: &RemoteTool,
) -> Map<String, Value> {
    let mut params = base_parameters(surface);
    params.insert("role".into(), role.as_str().into());

    let upstream = surface.upstream_name(&tool.name);
    if upstream != tool.name {
        params.insert("upstreamTool".into(), upstream.into());
    }

    match role {
        ToolRole::Discovery => {
            params.insert("query".into(), query.into());
        }
        ToolRole::Corroboration => {
            params.insert("input".into(), "discovery.entityIds".into());
        }
        ToolRole::Enrichment => {
            params.insert(OPTIONAL_KEY.into(), true.into());
            params.insert("input".into(), "discovery.entityId".into());
            params.insert(
                "queryLanguage".into(),
                QueryLanguage::for_tool(tool).as_str().into(),
            );
        }
    }

    params
}

fn inspect_capabilities_step(query: &str, surface: &WorkflowSurface) -> PlanStep {
    let mut params = base_parameters(surface);
    params.insert("query".into(), query.into());
    params.insert("fallbackReason".into(), NO_ROLE_TOOLS_REASON.into());
    params.insert(
        "availableTools".into(),
        surface
            .remote_tools
            .iter()
            .map(|t| Value::from(t.name.clone()))
            .collect::<Vec<_>>()
            .into(),
    );

    PlanStep {
        action: PlanAction::InspectCapabilities,
        target_tool: INSPECT_CAPABILITIES_TOOL.to_string(),
        parameters: params,
        order: 1,
    }
}
