//! Execute Workflow use case
//!
//! Runs one fact lookup against one connector:
//!
//! ```text
//! ROUTING -> DISCOVERY -> CORROBORATION -> [ENRICHMENT] -> STITCHING -> DONE
//!    |           |              |
//!    +-----------+--------------+----> FALLBACK
//! ```
//!
//! Remote calls run strictly in sequence, each under its own timeout.
//! Discovery and corroboration failures divert to the local fallback;
//! enrichment failures are recorded and skipped. The use case never returns
//! an error: every outcome is a [`WorkflowResult`].

use crate::config::ExecutionParams;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::local_fallback::LocalFallbackPort;
use crate::ports::progress::{NoProgress, WorkflowProgressNotifier};
use crate::ports::tool_transport::ToolTransport;
use factlink_domain::core::brand::{BRAND_TAG, CONNECTOR_KEY, PROVENANCE_KEY, branded};
use factlink_domain::core::string::preview;
use factlink_domain::plan::planner::NO_ROLE_TOOLS_REASON;
use factlink_domain::workflow::embedding::MAX_PLACEHOLDER_DIMENSIONS;
use factlink_domain::workflow::extract::{
    display_value, extract_candidates, extract_claims, extract_result_count,
};
use factlink_domain::workflow::value_objects::metadata_keys as keys;
use factlink_domain::{
    Candidate, Claim, ConnectorEntry, ExecutionPlan, PlanStep, QueryLanguage, RankedItem,
    ResultSource, RouteOptions, RoutingDecision, ToolRole, TransportError, WorkflowError,
    WorkflowPhase, WorkflowResult, WorkflowSurface, build_execution_plan, deterministic_embedding,
    normalize_tool_name, query_fingerprint, resolve_tools_with_source, route_fact_query,
};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Connector metadata flag asking for a placeholder query vector on discovery
pub const REQUIRES_VECTOR_KEY: &str = "requiresVector";

/// Fallback reason recorded when the caller cancels between steps
pub const CANCELLED_REASON: &str = "cancelled";

/// Number of discovered identifiers forwarded to corroboration
const CORROBORATION_FANOUT: usize = 3;

/// Upper bound on stitched attributes
const MAX_ATTRIBUTES: usize = 10;

/// Fallback reason when the plan has later steps but nothing to discover with
const NO_DISCOVERY_REASON: &str = "no-discovery-tool";

/// Input for the ExecuteWorkflow use case
#[derive(Debug, Clone)]
pub struct ExecuteWorkflowInput {
    /// Natural-language fact query
    pub query: String,
    /// Connector snapshot to run against
    pub connector: ConnectorEntry,
    /// Scope and dimension hint forwarded to the router
    pub route: RouteOptions,
    /// Timeout and enrichment switch
    pub params: ExecutionParams,
    /// Checked between steps; a cancelled token diverts to the fallback path
    pub cancellation: Option<CancellationToken>,
}

impl ExecuteWorkflowInput {
    pub fn new(query: impl Into<String>, connector: ConnectorEntry) -> Self {
        Self {
            query: query.into(),
            connector,
            route: RouteOptions::default(),
            params: ExecutionParams::default(),
            cancellation: None,
        }
    }

    pub fn with_route(mut self, route: RouteOptions) -> Self {
        self.route = route;
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn without_enrichment(mut self) -> Self {
        self.params.enable_enrichment = false;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Why the remote path was abandoned
struct Divert(String);

impl Divert {
    fn failed(phase: WorkflowPhase, error: &TransportError) -> Self {
        Divert(format!("{} failed: {}", phase.as_str(), error))
    }

    fn cancelled() -> Self {
        Divert(CANCELLED_REASON.to_string())
    }
}

/// Accumulates everything the remote path learns until stitching.
struct Stitcher {
    metadata: BTreeMap<String, Value>,
    steps_executed: Vec<&'static str>,
    skipped_steps: Vec<String>,
    degraded: bool,
    candidates: Vec<Candidate>,
    attributes: Map<String, Value>,
}

impl Stitcher {
    fn new(input: &ExecuteWorkflowInput) -> Self {
        let mut metadata = base_metadata(input);
        let resolved = resolve_tools_with_source(&input.connector);
        metadata.insert(keys::TOOL_SOURCE.into(), resolved.source.as_str().into());
        Self {
            metadata,
            steps_executed: Vec::new(),
            skipped_steps: Vec::new(),
            degraded: false,
            candidates: Vec::new(),
            attributes: Map::new(),
        }
    }

    fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    fn executed(&mut self, phase: WorkflowPhase) {
        self.steps_executed.push(phase.as_str());
    }

    fn skip(&mut self, role: ToolRole, reason: &str) {
        self.skipped_steps.push(format!("{}:{}", role.as_str(), reason));
        if role.is_required() {
            self.degraded = true;
        }
    }

    fn finish(mut self) -> WorkflowResult {
        let executed: Vec<Value> = self.steps_executed.iter().map(|s| Value::from(*s)).collect();
        self.set(keys::STEPS_EXECUTED, executed);
        if !self.skipped_steps.is_empty() {
            let skipped: Vec<Value> = self.skipped_steps.drain(..).map(Value::from).collect();
            self.set(keys::SKIPPED_STEPS, skipped);
        }
        if !self.attributes.is_empty() {
            let attributes = std::mem::take(&mut self.attributes);
            self.set(keys::ATTRIBUTES, Value::Object(attributes));
        }

        let content = stitch_content(&self.candidates, self.metadata.get(keys::ATTRIBUTES));
        let results = self
            .candidates
            .into_iter()
            .enumerate()
            .map(|(i, c)| RankedItem {
                position: i + 1,
                id: c.id,
                title: c.label,
                content: c.description.unwrap_or_default(),
                score: c.score,
                source: ResultSource::Remote,
            })
            .collect();

        WorkflowResult {
            content,
            results,
            metadata: self.metadata,
            rank_preserved: true,
            degraded: self.degraded,
            error: None,
        }
    }
}

fn base_metadata(input: &ExecuteWorkflowInput) -> BTreeMap<String, Value> {
    let mut metadata = BTreeMap::new();
    metadata.insert(PROVENANCE_KEY.to_string(), BRAND_TAG.into());
    metadata.insert(CONNECTOR_KEY.to_string(), input.connector.id.clone().into());
    metadata.insert(
        keys::QUERY_FINGERPRINT.to_string(),
        query_fingerprint(&input.query).into(),
    );
    metadata
}

fn stitch_content(candidates: &[Candidate], attributes: Option<&Value>) -> String {
    let Some(top) = candidates.first() else {
        return String::new();
    };

    let mut lines = Vec::new();
    let heading = match (&top.label, &top.description) {
        (Some(label), Some(desc)) => format!("{} ({}): {}", label, top.id, desc),
        (Some(label), None) => format!("{} ({})", label, top.id),
        (None, Some(desc)) => format!("{}: {}", top.id, desc),
        (None, None) => top.id.clone(),
    };
    lines.push(heading);

    if let Some(Value::Object(attrs)) = attributes {
        for (property, value) in attrs {
            lines.push(format!("  {}: {}", property, display_value(value)));
        }
    }

    lines.join("\n")
}

fn without_plan_keys(step: &PlanStep) -> Map<String, Value> {
    let mut args = step.parameters.clone();
    args.remove("input");
    args.remove("upstreamTool");
    args.remove("role");
    args
}

/// Use case for running a fact lookup workflow against one connector
pub struct ExecuteWorkflowUseCase<T: ToolTransport + ?Sized + 'static> {
    transport: Arc<T>,
    local_fallback: Option<Arc<dyn LocalFallbackPort>>,
    audit_logger: Arc<dyn AuditLogger>,
}

impl<T: ToolTransport + ?Sized + 'static> ExecuteWorkflowUseCase<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            local_fallback: None,
            audit_logger: Arc::new(NoAuditLogger),
        }
    }

    pub fn with_local_fallback(mut self, fallback: Arc<dyn LocalFallbackPort>) -> Self {
        self.local_fallback = Some(fallback);
        self
    }

    pub fn with_audit_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.audit_logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: ExecuteWorkflowInput) -> WorkflowResult {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: ExecuteWorkflowInput,
        progress: &dyn WorkflowProgressNotifier,
    ) -> WorkflowResult {
        info!(
            connector = %input.connector.id,
            query = %preview(&input.query, 80),
            "Starting workflow"
        );

        // Routing
        progress.on_phase_start(WorkflowPhase::Routing, None);
        let decision = route_fact_query(&input.query, &input.connector, input.route);
        self.audit_logger.log(AuditEvent::new(
            "route_decided",
            json!({
                "connectorId": input.connector.id,
                "toolName": decision.tool_name,
                "parameters": decision.parameters,
            }),
        ));

        if let Some(reason) = decision.fallback_reason() {
            progress.on_phase_complete(WorkflowPhase::Routing, false);
            let reason = reason.to_string();
            return self.fallback(&input, reason, progress).await;
        }
        progress.on_phase_complete(WorkflowPhase::Routing, true);

        let surface = WorkflowSurface::from_entry(&input.connector);
        let plan = build_execution_plan(&input.query, &surface);
        debug!(steps = plan.len(), "Plan built");

        if plan.is_fallback() {
            let reason = plan
                .steps()
                .first()
                .and_then(|step| step.parameters.get(keys::FALLBACK_REASON))
                .and_then(Value::as_str)
                .unwrap_or(NO_ROLE_TOOLS_REASON)
                .to_string();
            debug!(reason = %reason, "Plan holds only the inspect-capabilities step");
            return self.fallback(&input, reason, progress).await;
        }

        match self.run_remote(&input, &decision, &surface, &plan, progress).await {
            Ok(result) => {
                progress.on_phase_complete(WorkflowPhase::Done, true);
                self.audit_logger.log(AuditEvent::new(
                    "workflow_complete",
                    json!({
                        "connectorId": input.connector.id,
                        "degraded": result.degraded,
                        "resultCount": result.results.len(),
                    }),
                ));
                info!(
                    degraded = result.degraded,
                    results = result.results.len(),
                    "Workflow complete"
                );
                result
            }
            Err(Divert(reason)) => self.fallback(&input, reason, progress).await,
        }
    }

    /// Discovery, corroboration, enrichment and stitching.
    async fn run_remote(
        &self,
        input: &ExecuteWorkflowInput,
        decision: &RoutingDecision,
        surface: &WorkflowSurface,
        plan: &ExecutionPlan,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<WorkflowResult, Divert> {
        let mut stitcher = Stitcher::new(input);

        // Discovery
        if input.is_cancelled() {
            return Err(Divert::cancelled());
        }
        let Some((discovery_call, discovery_tool)) =
            discovery_target(input, decision, surface, plan)
        else {
            return Err(Divert(NO_DISCOVERY_REASON.to_string()));
        };
        let args = self.discovery_arguments(input, decision, &mut stitcher);
        let response = self
            .call_step(
                WorkflowPhase::Discovery,
                &discovery_call,
                args,
                input,
                progress,
            )
            .await
            .map_err(|e| Divert::failed(WorkflowPhase::Discovery, &e))?;
        stitcher.executed(WorkflowPhase::Discovery);

        let candidates = extract_candidates(&response);
        stitcher.set(keys::DISCOVERY_TOOL, discovery_tool);
        stitcher.set(keys::CANDIDATE_COUNT, candidates.len());
        debug!(candidates = candidates.len(), "Discovery returned");

        let Some(top) = candidates.first().cloned() else {
            warn!("Discovery returned no candidates; skipping dependent steps");
            if plan.step_for(ToolRole::Corroboration).is_some() {
                progress.on_step_skipped(WorkflowPhase::Corroboration, "no-candidates");
            }
            stitcher.skip(ToolRole::Corroboration, "no-candidates");
            if plan.step_for(ToolRole::Enrichment).is_some() {
                stitcher.skip(ToolRole::Enrichment, "no-candidates");
            }
            return Ok(stitcher.finish());
        };
        stitcher.set(keys::ENTITY_ID, top.id.clone());
        if let Some(label) = &top.label {
            stitcher.set(keys::ENTITY_LABEL, label.clone());
        }
        stitcher.candidates = candidates;

        // Corroboration
        match plan.step_for(ToolRole::Corroboration) {
            Some(step) => {
                if input.is_cancelled() {
                    return Err(Divert::cancelled());
                }
                let args = corroboration_arguments(step, &stitcher.candidates);
                let upstream = surface.upstream_name(&step.target_tool);
                let response = self
                    .call_step(WorkflowPhase::Corroboration, upstream, args, input, progress)
                    .await
                    .map_err(|e| Divert::failed(WorkflowPhase::Corroboration, &e))?;
                stitcher.executed(WorkflowPhase::Corroboration);
                stitcher.set(keys::CORROBORATION_TOOL, step.target_tool.clone());
                stitch_claims(&mut stitcher, &extract_claims(&response));
            }
            None => {
                debug!("No corroboration tool planned");
                progress.on_step_skipped(WorkflowPhase::Corroboration, "not-planned");
                stitcher.skip(ToolRole::Corroboration, "not-planned");
            }
        }

        // Enrichment
        match plan.step_for(ToolRole::Enrichment) {
            Some(_) if !input.params.enable_enrichment => {
                debug!("Enrichment disabled");
                progress.on_step_skipped(WorkflowPhase::Enrichment, "disabled");
                stitcher.skip(ToolRole::Enrichment, "disabled");
            }
            Some(step) => {
                if input.is_cancelled() {
                    return Err(Divert::cancelled());
                }
                self.run_enrichment(step, &top.id, surface, input, progress, &mut stitcher)
                    .await;
            }
            None => {}
        }

        progress.on_phase_start(WorkflowPhase::Stitching, None);
        let result = stitcher.finish();
        progress.on_phase_complete(WorkflowPhase::Stitching, true);
        Ok(result)
    }

    fn discovery_arguments(
        &self,
        input: &ExecuteWorkflowInput,
        decision: &RoutingDecision,
        stitcher: &mut Stitcher,
    ) -> Map<String, Value> {
        let mut args = decision.parameters.clone();
        if input.connector.metadata_bool(REQUIRES_VECTOR_KEY) {
            let dimensions = decision
                .dimension_hint()
                .or(decision.max_dimensions())
                .map(|d| d as usize)
                .unwrap_or(input.params.placeholder_dimensions)
                .clamp(1, MAX_PLACEHOLDER_DIMENSIONS);
            debug!(dimensions, "Attaching placeholder query vector");
            args.insert(
                "queryVector".into(),
                deterministic_embedding(&input.query, dimensions).into(),
            );
            stitcher.set("placeholderVectorDimensions", dimensions);
        }
        args
    }

    /// Advisory: failures are recorded and never divert to the fallback path.
    async fn run_enrichment(
        &self,
        step: &PlanStep,
        entity_id: &str,
        surface: &WorkflowSurface,
        input: &ExecuteWorkflowInput,
        progress: &dyn WorkflowProgressNotifier,
        stitcher: &mut Stitcher,
    ) {
        let language = step
            .parameters
            .get("queryLanguage")
            .and_then(Value::as_str)
            .map(QueryLanguage::parse)
            .unwrap_or_default();
        let query_text = language.build_query(entity_id);

        let mut args = without_plan_keys(step);
        args.insert("entityId".into(), entity_id.into());
        args.insert("query".into(), query_text.clone().into());

        stitcher.set(keys::ENRICHMENT_TOOL, step.target_tool.clone());
        stitcher.set(keys::ENRICHMENT_QUERY, query_text);

        let upstream = surface.upstream_name(&step.target_tool);
        match self
            .call_step(WorkflowPhase::Enrichment, upstream, args, input, progress)
            .await
        {
            Ok(response) => {
                stitcher.executed(WorkflowPhase::Enrichment);
                stitcher.set(keys::ENRICHMENT_RESULT_COUNT, extract_result_count(&response));
            }
            Err(e) => {
                warn!(tool = %step.target_tool, error = %e, "Enrichment failed; continuing without it");
                stitcher.set(keys::ENRICHMENT_ERROR, e.to_string());
                stitcher.skip(ToolRole::Enrichment, "failed");
            }
        }
    }

    /// One remote call under the configured timeout.
    async fn call_step(
        &self,
        phase: WorkflowPhase,
        tool_name: &str,
        args: Map<String, Value>,
        input: &ExecuteWorkflowInput,
        progress: &dyn WorkflowProgressNotifier,
    ) -> Result<Value, TransportError> {
        progress.on_phase_start(phase, Some(tool_name));
        debug!(phase = phase.as_str(), tool = tool_name, "Calling remote tool");

        self.audit_logger.log(AuditEvent::new(
            "tool_call",
            json!({ "phase": phase.as_str(), "tool": tool_name, "args": args }),
        ));

        let timeout = input.params.timeout;
        let outcome = match tokio::time::timeout(timeout, self.transport.call_tool(tool_name, &args))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(tool_name, input.params.timeout_ms())),
        };

        match &outcome {
            Ok(_) => {
                self.audit_logger.log(AuditEvent::new(
                    "tool_result",
                    json!({ "phase": phase.as_str(), "tool": tool_name, "success": true }),
                ));
            }
            Err(e) => {
                warn!(phase = phase.as_str(), tool = tool_name, error = %e, "Remote tool call failed");
                self.audit_logger.log(AuditEvent::new(
                    "tool_result",
                    json!({
                        "phase": phase.as_str(),
                        "tool": tool_name,
                        "success": false,
                        "errorKind": e.kind.as_str(),
                        "error": e.message,
                    }),
                ));
            }
        }
        progress.on_phase_complete(phase, outcome.is_ok());

        outcome
    }

    /// Answer from the local store, or explain why nothing could answer.
    async fn fallback(
        &self,
        input: &ExecuteWorkflowInput,
        reason: String,
        progress: &dyn WorkflowProgressNotifier,
    ) -> WorkflowResult {
        warn!(reason = %reason, "Falling back to local search");
        progress.on_fallback(&reason);
        progress.on_phase_start(WorkflowPhase::Fallback, None);
        self.audit_logger.log(AuditEvent::new(
            "fallback",
            json!({ "connectorId": input.connector.id, "reason": reason }),
        ));

        let mut metadata = base_metadata(input);
        metadata.insert(keys::FALLBACK_REASON.to_string(), reason.clone().into());

        let Some(store) = &self.local_fallback else {
            progress.on_phase_complete(WorkflowPhase::Fallback, false);
            return WorkflowResult {
                metadata,
                degraded: true,
                error: Some(WorkflowError::configuration(branded(format!(
                    "remote tools unavailable ({}) and no local fallback is configured",
                    reason
                )))),
                ..WorkflowResult::default()
            };
        };

        match store.search(&input.query).await {
            Ok(hits) => {
                let results = RankedItem::from_local_hits(hits);
                metadata.insert(keys::FALLBACK_RESULT_COUNT.to_string(), results.len().into());
                let content = results
                    .iter()
                    .map(|item| {
                        format!(
                            "{}. {}: {}",
                            item.position,
                            item.title.as_deref().unwrap_or(&item.id),
                            item.content
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                progress.on_phase_complete(WorkflowPhase::Fallback, true);
                info!(results = results.len(), "Answered from local fallback");

                WorkflowResult {
                    content,
                    results,
                    metadata,
                    rank_preserved: true,
                    degraded: true,
                    error: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "Local fallback failed");
                progress.on_phase_complete(WorkflowPhase::Fallback, false);
                WorkflowResult {
                    metadata,
                    degraded: true,
                    error: Some(WorkflowError::configuration(branded(format!(
                        "remote tools unavailable ({}) and local fallback failed: {}",
                        reason, e
                    )))),
                    ..WorkflowResult::default()
                }
            }
        }
    }
}

/// Upstream name to call for discovery, plus its canonical name.
///
/// The routed tool is kept when it serves discovery and no later step claims
/// it, so a requested scope still picks its variant. Otherwise the plan's
/// discovery step decides.
fn discovery_target(
    input: &ExecuteWorkflowInput,
    decision: &RoutingDecision,
    surface: &WorkflowSurface,
    plan: &ExecutionPlan,
) -> Option<(String, String)> {
    let step = plan.step_for(ToolRole::Discovery)?;
    let routed =
        normalize_tool_name(&decision.tool_name, &input.connector.id, &input.connector)
            .normalized_name;

    let claimed_elsewhere = plan
        .steps()
        .iter()
        .any(|s| s.role() != Some(ToolRole::Discovery) && s.target_tool == routed);
    let serves_discovery = surface
        .remote_tools
        .iter()
        .find(|t| t.name == routed)
        .is_some_and(|t| ToolRole::Discovery.matches_tag(t) || ToolRole::Discovery.matches_name(t));

    if routed == step.target_tool || (serves_discovery && !claimed_elsewhere) {
        return Some((decision.tool_name.clone(), routed));
    }

    debug!(routed = %routed, planned = %step.target_tool, "Routed tool is not a discovery tool; using the planned one");
    Some((
        surface.upstream_name(&step.target_tool).to_string(),
        step.target_tool.clone(),
    ))
}

fn corroboration_arguments(step: &PlanStep, candidates: &[Candidate]) -> Map<String, Value> {
    let mut args = without_plan_keys(step);
    let ids: Vec<Value> = candidates
        .iter()
        .take(CORROBORATION_FANOUT)
        .map(|c| Value::from(c.id.clone()))
        .collect();
    if let Some(Value::String(top)) = ids.first() {
        args.insert("entityId".into(), top.clone().into());
    }
    args.insert("entityIds".into(), ids.into());
    args
}

fn stitch_claims(stitcher: &mut Stitcher, claims: &[Claim]) {
    stitcher.set(keys::CLAIM_COUNT, claims.len());
    if let Some(id) = claims.iter().find_map(|c| c.id.clone()) {
        stitcher.set(keys::CLAIM_ID, id);
    }
    for claim in claims {
        if stitcher.attributes.len() >= MAX_ATTRIBUTES {
            break;
        }
        if let (Some(property), Some(value)) = (&claim.property, &claim.value) {
            stitcher
                .attributes
                .entry(property.clone())
                .or_insert_with(|| display_value(value).into());
        }
    }
}
