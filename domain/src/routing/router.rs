//! Query Router
//!
//! Chooses between the connector's primary vector tool (`facts` scope) and
//! its secondary variant (`properties` scope), and builds the invocation
//! parameters. A connector without tools yields a sentinel decision naming
//! [`INSPECT_CAPABILITIES_TOOL`], which callers must never invoke remotely.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::connector::{ConnectorEntry, RemoteTool, resolve_tools};
use crate::core::brand::{BRAND_TAG, CONNECTOR_KEY, INSPECT_CAPABILITIES_TOOL, PROVENANCE_KEY};

/// Metadata key for a connector-level embedding dimension hint
pub const DIMENSION_HINT_KEY: &str = "dimensionHint";
/// Metadata key for the largest embedding the connector accepts
pub const MAX_DIMENSIONS_KEY: &str = "maxDimensions";
/// Metadata key for a nested embedding capability object
pub const EMBEDDING_KEY: &str = "embedding";

/// Fallback reason recorded when the connector has no tools
pub const NO_TOOLS_REASON: &str = "no-remote-tools";

/// Which entry point a fact query targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactScope {
    /// Entity facts, served by the primary vector tool
    #[default]
    Facts,
    /// Property lookups, served by the secondary vector tool
    Properties,
}

impl FactScope {
    pub fn as_str(&self) -> &str {
        match self {
            FactScope::Facts => "facts",
            FactScope::Properties => "properties",
        }
    }
}

impl std::fmt::Display for FactScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FactScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "facts" | "fact" | "primary" => Ok(FactScope::Facts),
            "properties" | "property" | "secondary" => Ok(FactScope::Properties),
            other => Err(format!("unknown scope: {}", other)),
        }
    }
}

/// Optional routing knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    pub scope: Option<FactScope>,
    pub dimension_hint: Option<u64>,
}

impl RouteOptions {
    pub fn with_scope(mut self, scope: FactScope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_dimension_hint(mut self, hint: u64) -> Self {
        self.dimension_hint = Some(hint);
        self
    }
}

/// The tool to call and the arguments to call it with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecision {
    pub tool_name: String,
    pub parameters: Map<String, Value>,
}

impl RoutingDecision {
    /// True for the "inspect capabilities" sentinel. Do not invoke it.
    pub fn is_fallback(&self) -> bool {
        self.tool_name == INSPECT_CAPABILITIES_TOOL
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        self.parameters.get("fallbackReason").and_then(Value::as_str)
    }

    pub fn dimension_hint(&self) -> Option<u64> {
        self.parameters.get(DIMENSION_HINT_KEY).and_then(Value::as_u64)
    }

    pub fn max_dimensions(&self) -> Option<u64> {
        self.parameters.get(MAX_DIMENSIONS_KEY).and_then(Value::as_u64)
    }
}

/// Route a natural-language fact query to an entry-point tool.
pub fn route_fact_query(
    query: &str,
    connector: &ConnectorEntry,
    options: RouteOptions,
) -> RoutingDecision {
    let tools = resolve_tools(connector);
    let scope = options.scope.unwrap_or_default();

    let mut parameters = Map::new();
    parameters.insert(PROVENANCE_KEY.into(), BRAND_TAG.into());
    parameters.insert(CONNECTOR_KEY.into(), connector.id.clone().into());
    parameters.insert("query".into(), query.into());

    let Some(tool) = select_entry_point(&tools, scope) else {
        parameters.insert("fallbackReason".into(), NO_TOOLS_REASON.into());
        return RoutingDecision {
            tool_name: INSPECT_CAPABILITIES_TOOL.to_string(),
            parameters,
        };
    };

    parameters.insert("scope".into(), scope.as_str().into());

    let hint = options
        .dimension_hint
        .or_else(|| connector.metadata_u64(DIMENSION_HINT_KEY))
        .or_else(|| embedding_field(connector, DIMENSION_HINT_KEY));
    if let Some(hint) = hint {
        parameters.insert(DIMENSION_HINT_KEY.into(), hint.into());
    }

    let max_dimensions = connector
        .metadata_u64(MAX_DIMENSIONS_KEY)
        .or_else(|| embedding_field(connector, MAX_DIMENSIONS_KEY));
    if let Some(max) = max_dimensions {
        parameters.insert(MAX_DIMENSIONS_KEY.into(), max.into());
    }

    RoutingDecision {
        tool_name: tool.name.clone(),
        parameters,
    }
}

fn embedding_field(connector: &ConnectorEntry, key: &str) -> Option<u64> {
    connector
        .metadata_value(EMBEDDING_KEY)?
        .get(key)?
        .as_u64()
}

fn is_vector_tool(tool: &RemoteTool) -> bool {
    tool.has_tag("vector") || tool.capability().contains("vector")
}

fn is_property_variant(tool: &RemoteTool) -> bool {
    tool.has_scope("properties") || tool.has_tag("properties") || tool.capability().contains("propert")
}

/// Primary = first vector tool that is not the properties variant;
/// secondary = first vector tool that is. Either falls back to the other,
/// then to the first declared tool.
fn select_entry_point(tools: &[RemoteTool], scope: FactScope) -> Option<&RemoteTool> {
    let mut vectors = tools.iter().filter(|t| is_vector_tool(t));
    let primary = vectors.clone().find(|t| !is_property_variant(t));
    let secondary = vectors.find(|t| is_property_variant(t));

    let preferred = match scope {
        FactScope::Facts => primary.or(secondary),
        FactScope::Properties => secondary.or(primary),
    };

    preferred.or_else(|| tools.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wikidata() -> ConnectorEntry {
        ConnectorEntry::new("wikidata", "Wikidata")
    }

    #[test]
    fn test_default_scope_routes_to_primary_vector_tool() {
        let decision = route_fact_query("Who invented the telephone?", &wikidata(), RouteOptions::default());

        assert_eq!(decision.tool_name, "wikidata.vector_search_items");
        assert!(!decision.is_fallback());
        assert_eq!(decision.parameters[PROVENANCE_KEY], json!(BRAND_TAG));
        assert_eq!(decision.parameters["query"], json!("Who invented the telephone?"));
        assert_eq!(decision.parameters["scope"], json!("facts"));
    }

    #[test]
    fn test_properties_scope_routes_to_secondary_variant() {
        let options = RouteOptions::default().with_scope(FactScope::Properties);
        let decision = route_fact_query("date of birth", &wikidata(), options);
        assert_eq!(decision.tool_name, "wikidata.vector_search_properties");
        assert_eq!(decision.parameters["scope"], json!("properties"));
    }

    #[test]
    fn test_properties_scope_without_secondary_uses_primary() {
        let connector = ConnectorEntry::new("acme", "Acme").with_scope("facts");
        let options = RouteOptions::default().with_scope(FactScope::Properties);
        assert_eq!(route_fact_query("q", &connector, options).tool_name, "acme.vector");
    }

    #[test]
    fn test_dimension_hint_from_options_wins() {
        let connector = wikidata().with_metadata_value(DIMENSION_HINT_KEY, 256);
        let options = RouteOptions::default().with_dimension_hint(768);
        let decision = route_fact_query("q", &connector, options);
        assert_eq!(decision.dimension_hint(), Some(768));
    }

    #[test]
    fn test_embedding_metadata_forwarded() {
        let connector = wikidata().with_metadata_value(
            EMBEDDING_KEY,
            json!({"dimensionHint": 512, "maxDimensions": 1024}),
        );
        let decision = route_fact_query("q", &connector, RouteOptions::default());
        assert_eq!(decision.dimension_hint(), Some(512));
        assert_eq!(decision.max_dimensions(), Some(1024));
    }

    #[test]
    fn test_missing_dimension_info_is_not_an_error() {
        let decision = route_fact_query("q", &wikidata(), RouteOptions::default());
        assert!(decision.dimension_hint().is_none());
        assert!(!decision.parameters.contains_key(MAX_DIMENSIONS_KEY));
    }

    #[test]
    fn test_no_tools_yields_sentinel() {
        let connector = ConnectorEntry::new("acme", "Acme");
        let decision = route_fact_query("q", &connector, RouteOptions::default());

        assert!(decision.is_fallback());
        assert_eq!(decision.tool_name, INSPECT_CAPABILITIES_TOOL);
        assert_eq!(decision.fallback_reason(), Some(NO_TOOLS_REASON));
        assert_eq!(decision.parameters[PROVENANCE_KEY], json!(BRAND_TAG));
    }

    #[test]
    fn test_non_vector_connector_routes_to_first_tool() {
        let connector = ConnectorEntry::new("acme", "Acme")
            .with_remote_tools(vec![RemoteTool::new("acme.lookup"), RemoteTool::new("acme.other")]);
        let decision = route_fact_query("q", &connector, RouteOptions::default());
        assert_eq!(decision.tool_name, "acme.lookup");
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("Properties".parse::<FactScope>(), Ok(FactScope::Properties));
        assert_eq!("facts".parse::<FactScope>(), Ok(FactScope::Facts));
        assert!("weather".parse::<FactScope>().is_err());
    }
}
