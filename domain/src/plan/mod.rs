//! Workflow planning
//!
//! Turns a connector's tool roster into an ordered plan of up to three
//! role-tagged steps:
//!
//! ```text
//! ┌────────────┐    ┌───────────────┐    ┌──────────────────────┐
//! │ discovery  │───▶│ corroboration │───▶│ enrichment (optional)│
//! │ vector     │    │ claims        │    │ sparql / query       │
//! └────────────┘    └───────────────┘    └──────────────────────┘
//! ```
//!
//! Missing roles are skipped. A roster with no role-tagged tool at all
//! produces the single `inspect-capabilities` step instead of an empty plan.

pub mod entities;
pub mod planner;

pub use entities::{ExecutionPlan, PlanAction, PlanStep, ToolRole, WorkflowSurface};
pub use planner::{assign_roles, build_execution_plan, build_plan};
