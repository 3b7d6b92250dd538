//! Query routing
//!
//! Picks the single entry-point tool for a fact query. See [`route_fact_query`].

pub mod router;

pub use router::{FactScope, RouteOptions, RoutingDecision, route_fact_query};
