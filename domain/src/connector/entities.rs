//! Connector domain entities

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

static TOOL_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._-]+$").expect("tool name pattern is valid"));

/// One capability a connector exposes.
///
/// `name` is the only required field. Empty `tags` or `scopes` mean the tool
/// has unconstrained applicability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTool {
    /// Canonical dotted identifier (e.g. `wikidata.vector_search_items`)
    pub name: String,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category labels such as `vector`, `claims`, `sparql`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Applicability labels such as `facts`, `properties`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

impl RemoteTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tags: Vec::new(),
            scopes: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Check a candidate tool name against `^[a-z0-9._-]+$`.
    pub fn is_valid_name(name: &str) -> bool {
        TOOL_NAME_PATTERN.is_match(name)
    }

    pub fn has_valid_name(&self) -> bool {
        Self::is_valid_name(&self.name)
    }

    /// Case-insensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Case-insensitive scope membership
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s.eq_ignore_ascii_case(scope))
    }

    /// True when the tool declares no scopes, i.e. applies everywhere.
    pub fn is_unconstrained(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Whether the tool applies to `scope` (explicitly or by being unconstrained).
    pub fn applies_to(&self, scope: &str) -> bool {
        self.is_unconstrained() || self.has_scope(scope)
    }

    /// The part of the name after the connector namespace.
    ///
    /// `wikidata.get_entity_claims` yields `get_entity_claims`; a name
    /// without a namespace is returned whole.
    pub fn capability(&self) -> &str {
        self.name
            .split_once('.')
            .map(|(_, rest)| rest)
            .unwrap_or(&self.name)
    }
}

/// One integration's declared state, as produced by the manifest layer.
///
/// Treated as immutable for the duration of a resolution or workflow run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorEntry {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    /// Explicitly declared tools (highest precedence)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_tools: Option<Vec<RemoteTool>>,
    /// Free-form metadata; may carry a legacy `remoteTools` array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Connector-level scope labels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

impl ConnectorEntry {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    pub fn with_remote_tools(mut self, tools: Vec<RemoteTool>) -> Self {
        self.remote_tools = Some(tools);
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Insert a single metadata key (builder pattern)
    pub fn with_metadata_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }

    /// Case-insensitive connector-level scope membership
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s.eq_ignore_ascii_case(scope))
    }

    /// Read a positive integer from metadata, accepting numbers or numeric strings.
    pub fn metadata_u64(&self, key: &str) -> Option<u64> {
        match self.metadata_value(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn metadata_bool(&self, key: &str) -> bool {
        self.metadata_value(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_name_validation() {
        assert!(RemoteTool::is_valid_name("wikidata.vector_search_items"));
        assert!(RemoteTool::is_valid_name("kg-1.get_claims"));
        assert!(!RemoteTool::is_valid_name(""));
        assert!(!RemoteTool::is_valid_name("Wikidata.Search"));
        assert!(!RemoteTool::is_valid_name("has space"));
    }

    #[test]
    fn test_tag_and_scope_matching_is_case_insensitive() {
        let tool = RemoteTool::new("kg.vector")
            .with_tags(["Vector"])
            .with_scopes(["FACTS"]);

        assert!(tool.has_tag("vector"));
        assert!(tool.has_scope("facts"));
        assert!(tool.applies_to("facts"));
        assert!(!tool.applies_to("properties"));
    }

    #[test]
    fn test_unconstrained_tool_applies_everywhere() {
        let tool = RemoteTool::new("kg.vector");
        assert!(tool.is_unconstrained());
        assert!(tool.applies_to("properties"));
    }

    #[test]
    fn test_capability_strips_namespace() {
        assert_eq!(
            RemoteTool::new("wikidata.get_entity_claims").capability(),
            "get_entity_claims"
        );
        assert_eq!(RemoteTool::new("plain").capability(), "plain");
    }

    #[test]
    fn test_connector_deserializes_camel_case() {
        let entry: ConnectorEntry = serde_json::from_value(json!({
            "id": "wikidata",
            "displayName": "Wikidata",
            "remoteTools": [{"name": "wikidata.vector", "tags": ["vector"]}],
            "scopes": ["facts"]
        }))
        .unwrap();

        assert_eq!(entry.display_name, "Wikidata");
        assert_eq!(entry.remote_tools.as_ref().unwrap().len(), 1);
        assert!(entry.has_scope("Facts"));
        assert!(entry.metadata.is_none());
    }

    #[test]
    fn test_metadata_accessors() {
        let entry = ConnectorEntry::new("kg", "KG")
            .with_metadata_value("dimensionHint", "512")
            .with_metadata_value("maxDimensions", 1024)
            .with_metadata_value("requiresVector", true);

        assert_eq!(entry.metadata_u64("dimensionHint"), Some(512));
        assert_eq!(entry.metadata_u64("maxDimensions"), Some(1024));
        assert!(entry.metadata_bool("requiresVector"));
        assert!(!entry.metadata_bool("missing"));
    }
}
