//! Domain layer for factlink
//!
//! This crate contains the pure core of connector tool discovery and
//! multi-step fact retrieval. It performs no I/O.
//!
//! # Core Concepts
//!
//! ## Connectors and tools
//!
//! A [`ConnectorEntry`] is one integration's declared state. Its tools come
//! from exactly one of three sources (declared, metadata, synthesized),
//! picked by [`resolve_tools`]. Upstream names drift between deployments, so
//! [`normalize_tool_name`] maps them to canonical dotted identifiers.
//!
//! ## Routing and planning
//!
//! [`route_fact_query`] picks the entry-point tool for a query.
//! [`build_plan`] assembles up to three role-tagged steps
//! (discovery → corroboration → optional enrichment), degrading gracefully
//! when roles are missing and never returning an empty plan.
//!
//! ## Workflow results
//!
//! [`WorkflowResult`] carries content, ranked items and ordered provenance
//! metadata, plus `degraded` / `rank_preserved` quality flags.

pub mod connector;
pub mod core;
pub mod plan;
pub mod routing;
pub mod tool;
pub mod workflow;

// Re-export commonly used types
pub use connector::{
    ConnectorEntry, NormalizedToolName, RemoteTool, ResolvedTools, ToolNameTable, ToolSource,
    normalize_tool_name, resolve_tools, resolve_tools_with_source,
};
pub use core::{
    brand::{BRAND_TAG, INSPECT_CAPABILITIES_TOOL},
    error::{WorkflowError, WorkflowErrorKind},
};
pub use plan::{
    ExecutionPlan, PlanAction, PlanStep, ToolRole, WorkflowSurface, build_execution_plan,
    build_plan,
};
pub use routing::{FactScope, RouteOptions, RoutingDecision, route_fact_query};
pub use tool::{ToolCall, TransportError, TransportErrorKind};
pub use workflow::{
    Candidate, Claim, QueryLanguage, RankedItem, ResultSource, SearchHit, WorkflowPhase,
    WorkflowResult, deterministic_embedding, query_fingerprint,
};
