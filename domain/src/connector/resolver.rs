//! Tool Resolver
//!
//! Produces the authoritative tool list for a connector from three possible
//! sources, in strict precedence order. The first source that yields any
//! tools wins; sources are never merged.
//!
//! | Precedence | Source | [`ToolSource`] |
//! |------------|--------|----------------|
//! | 1 | `ConnectorEntry::remote_tools` (non-empty) | `Declared` |
//! | 2 | `metadata.remoteTools` array, malformed entries skipped | `Metadata` |
//! | 3 | Known-integration heuristics, then generic `facts` scope | `Synthesized` |
//! | 4 | Nothing matched | `None` |
//!
//! Resolution is a pure function of its input and never fails: an empty list
//! means "no tools available".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entities::{ConnectorEntry, RemoteTool};
use crate::core::string::slug;

/// Metadata key holding the legacy tool list.
pub const METADATA_TOOLS_KEY: &str = "remoteTools";

/// Scope that triggers synthesis of a generic vector tool.
pub const GENERIC_FACTS_SCOPE: &str = "facts";

/// Which source produced a resolved tool list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolSource {
    Declared,
    Metadata,
    Synthesized,
    None,
}

impl ToolSource {
    pub fn as_str(&self) -> &str {
        match self {
            ToolSource::Declared => "declared",
            ToolSource::Metadata => "metadata",
            ToolSource::Synthesized => "synthesized",
            ToolSource::None => "none",
        }
    }
}

impl std::fmt::Display for ToolSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tool list plus the source it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTools {
    pub source: ToolSource,
    pub tools: Vec<RemoteTool>,
}

impl ResolvedTools {
    fn new(source: ToolSource, tools: Vec<RemoteTool>) -> Self {
        Self { source, tools }
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// A hardcoded tool template for a recognized integration.
struct ToolTemplate {
    capability: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
    scopes: &'static [&'static str],
}

/// Heuristic for an integration whose tool roster is well known.
struct KnownIntegration {
    /// Case-insensitive substrings matched against id, display name and scopes
    markers: &'static [&'static str],
    tools: &'static [ToolTemplate],
}

const KNOWN_INTEGRATIONS: &[KnownIntegration] = &[KnownIntegration {
    markers: &["wikidata", "knowledge-graph", "knowledge_graph"],
    tools: &[
        ToolTemplate {
            capability: "vector_search_items",
            description: "Semantic search over knowledge-graph items",
            tags: &["vector", "items"],
            scopes: &["facts"],
        },
        ToolTemplate {
            capability: "vector_search_properties",
            description: "Semantic search over knowledge-graph properties",
            tags: &["vector", "properties"],
            scopes: &["properties"],
        },
        ToolTemplate {
            capability: "get_entity_claims",
            description: "Fetch the claims recorded for an entity",
            tags: &["claims"],
            scopes: &["facts"],
        },
        ToolTemplate {
            capability: "execute_sparql",
            description: "Run a SPARQL query against the graph",
            tags: &["sparql", "query"],
            scopes: &["facts"],
        },
    ],
}];

impl KnownIntegration {
    fn matches(&self, entry: &ConnectorEntry) -> bool {
        let haystacks = std::iter::once(entry.id.as_str())
            .chain(std::iter::once(entry.display_name.as_str()))
            .chain(entry.scopes.iter().map(String::as_str))
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>();

        self.markers
            .iter()
            .any(|marker| haystacks.iter().any(|h| h.contains(marker)))
    }

    fn synthesize(&self, namespace: &str) -> Vec<RemoteTool> {
        self.tools
            .iter()
            .map(|t| {
                RemoteTool::new(format!("{}.{}", namespace, t.capability))
                    .with_description(t.description)
                    .with_tags(t.tags.iter().copied())
                    .with_scopes(t.scopes.iter().copied())
            })
            .collect()
    }
}

/// Resolve the tools a connector exposes.
pub fn resolve_tools(entry: &ConnectorEntry) -> Vec<RemoteTool> {
    resolve_tools_with_source(entry).tools
}

/// Resolve the tools a connector exposes, reporting which source won.
pub fn resolve_tools_with_source(entry: &ConnectorEntry) -> ResolvedTools {
    if let Some(declared) = entry.remote_tools.as_ref().filter(|t| !t.is_empty()) {
        return ResolvedTools::new(ToolSource::Declared, declared.clone());
    }

    let from_metadata = tools_from_metadata(entry);
    if !from_metadata.is_empty() {
        return ResolvedTools::new(ToolSource::Metadata, from_metadata);
    }

    let synthesized = synthesize_tools(entry);
    if !synthesized.is_empty() {
        return ResolvedTools::new(ToolSource::Synthesized, synthesized);
    }

    ResolvedTools::new(ToolSource::None, Vec::new())
}

/// Parse `metadata.remoteTools`, skipping malformed entries.
///
/// An entry is kept only if it deserializes, has a valid non-empty name and
/// carries a description.
fn tools_from_metadata(entry: &ConnectorEntry) -> Vec<RemoteTool> {
    let Some(Value::Array(items)) = entry.metadata_value(METADATA_TOOLS_KEY) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<RemoteTool>(item.clone()) {
            Ok(tool) if tool.has_valid_name() && tool.description.is_some() => Some(tool),
            _ => None,
        })
        .collect()
}

fn synthesize_tools(entry: &ConnectorEntry) -> Vec<RemoteTool> {
    let namespace = slug(&entry.id);
    if namespace.is_empty() {
        return Vec::new();
    }

    if let Some(known) = KNOWN_INTEGRATIONS.iter().find(|k| k.matches(entry)) {
        return known.synthesize(&namespace);
    }

    if entry.has_scope(GENERIC_FACTS_SCOPE) {
        return vec![
            RemoteTool::new(format!("{}.vector", namespace))
                .with_description("Generic vector search over connector facts")
                .with_tags(["vector"])
                .with_scopes([GENERIC_FACTS_SCOPE]),
        ];
    }

    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn declared_tool() -> RemoteTool {
        RemoteTool::new("acme.search")
            .with_description("search")
            .with_tags(["vector"])
    }

    #[test]
    fn test_declared_tools_win_over_metadata() {
        let entry = ConnectorEntry::new("acme", "Acme")
            .with_remote_tools(vec![declared_tool()])
            .with_metadata_value(
                METADATA_TOOLS_KEY,
                json!([{"name": "acme.other", "description": "other"}]),
            )
            .with_scope("facts");

        let resolved = resolve_tools_with_source(&entry);
        assert_eq!(resolved.source, ToolSource::Declared);
        assert_eq!(resolved.tools, vec![declared_tool()]);
    }

    #[test]
    fn test_declared_precedence_holds_for_any_metadata() {
        let metadata_variants = [
            json!(null),
            json!("garbage"),
            json!([]),
            json!([{"name": "x.y", "description": "d"}, {"bad": true}]),
        ];

        for variant in metadata_variants {
            let entry = ConnectorEntry::new("wikidata", "Wikidata")
                .with_remote_tools(vec![declared_tool()])
                .with_metadata_value(METADATA_TOOLS_KEY, variant)
                .with_scope("facts");
            assert_eq!(resolve_tools(&entry), vec![declared_tool()]);
        }
    }

    #[test]
    fn test_empty_declared_list_falls_through() {
        let entry = ConnectorEntry::new("acme", "Acme")
            .with_remote_tools(Vec::new())
            .with_metadata_value(
                METADATA_TOOLS_KEY,
                json!([{"name": "acme.lookup", "description": "Lookup"}]),
            );

        let resolved = resolve_tools_with_source(&entry);
        assert_eq!(resolved.source, ToolSource::Metadata);
        assert_eq!(resolved.tools[0].name, "acme.lookup");
    }

    #[test]
    fn test_metadata_skips_malformed_entries() {
        let entry = ConnectorEntry::new("acme", "Acme").with_metadata_value(
            METADATA_TOOLS_KEY,
            json!([
                {"name": "acme.good", "description": "ok", "tags": ["vector"]},
                {"name": "acme.no_description"},
                {"description": "no name"},
                {"name": "Acme Bad Name", "description": "invalid"},
                "not an object",
                {"name": "acme.also_good", "description": "ok too", "scopes": ["facts"]}
            ]),
        );

        let names: Vec<_> = resolve_tools(&entry).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["acme.good", "acme.also_good"]);
    }

    #[test]
    fn test_all_malformed_metadata_falls_through_to_synthesis() {
        let entry = ConnectorEntry::new("acme", "Acme")
            .with_metadata_value(METADATA_TOOLS_KEY, json!([{"name": "acme.x"}]))
            .with_scope("facts");

        let resolved = resolve_tools_with_source(&entry);
        assert_eq!(resolved.source, ToolSource::Synthesized);
        assert_eq!(resolved.tools[0].name, "acme.vector");
    }

    #[test]
    fn test_known_integration_synthesis() {
        let entry = ConnectorEntry::new("wd", "Wikidata Knowledge Base");
        let resolved = resolve_tools_with_source(&entry);

        assert_eq!(resolved.source, ToolSource::Synthesized);
        let names: Vec<_> = resolved.tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "wd.vector_search_items",
                "wd.vector_search_properties",
                "wd.get_entity_claims",
                "wd.execute_sparql",
            ]
        );
    }

    #[test]
    fn test_known_integration_matched_by_scope() {
        let entry = ConnectorEntry::new("graph01", "Graph").with_scope("Knowledge-Graph");
        assert_eq!(resolve_tools(&entry).len(), 4);
    }

    #[test]
    fn test_generic_facts_scope_synthesizes_vector_tool() {
        let entry = ConnectorEntry::new("acme", "Acme").with_scope("facts");
        let tools = resolve_tools(&entry);

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "acme.vector");
        assert!(tools[0].has_tag("vector"));
    }

    #[test]
    fn test_no_source_yields_empty_list() {
        let entry = ConnectorEntry::new("acme", "Acme").with_scope("weather");
        let resolved = resolve_tools_with_source(&entry);

        assert_eq!(resolved.source, ToolSource::None);
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_synthesis_is_isolated_per_connector() {
        let synthesized = ConnectorEntry::new("wikidata", "Wikidata");
        let bare = ConnectorEntry::new("acme", "Acme");

        let first = resolve_tools(&synthesized);
        assert!(!first.is_empty());
        assert!(resolve_tools(&bare).is_empty());
        assert!(
            first.iter().all(|t| t.name.starts_with("wikidata.")),
            "synthesized tools must be namespaced to their own connector"
        );
    }
}
