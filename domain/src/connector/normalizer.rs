//! Name Normalizer
//!
//! Upstream deployments name the same capability differently
//! (`get_entity_claims` vs `get_claims`, `execute_query` vs `query`). The
//! normalizer maps every upstream name onto a canonical dotted identifier
//! namespaced under the connector id, so the router, planner and executor
//! only ever see canonical names.
//!
//! ```text
//! get_claims        ─┐
//! get_entity_claims ─┼─▶ wikidata.get_entity_claims
//! entity_claims     ─┘
//!
//! execute_query     ─┐
//! query             ─┼─▶ wikidata.execute_sparql
//! sparql_query      ─┘
//!
//! lookup_labels     ───▶ wikidata.lookup_labels   (unknown: passed through)
//! ```
//!
//! Tags and scopes are attached by cross-referencing the normalized name
//! against the connector's resolved tool list.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use super::entities::ConnectorEntry;
use super::resolver::resolve_tools;
use crate::core::string::slug;

/// Canonical capability → upstream variants
const KNOWN_VARIANTS: &[(&str, &[&str])] = &[
    (
        "vector_search_items",
        &["search_items", "vector_search", "semantic_search", "item_search"],
    ),
    (
        "vector_search_properties",
        &["search_properties", "property_search", "vector_search_props"],
    ),
    (
        "get_entity_claims",
        &["get_claims", "entity_claims", "claims"],
    ),
    (
        "execute_sparql",
        &["execute_query", "query", "sparql", "sparql_query", "run_sparql"],
    ),
];

static BUILTIN_TABLE: LazyLock<ToolNameTable> = LazyLock::new(|| {
    KNOWN_VARIANTS
        .iter()
        .fold(ToolNameTable::new(), |table, (canonical, variants)| {
            table.register_aliases(*canonical, variants.iter().copied())
        })
});

/// Alias table from upstream capability names to canonical ones.
#[derive(Debug, Clone, Default)]
pub struct ToolNameTable {
    /// Upstream variant → canonical capability (e.g. "get_claims" → "get_entity_claims")
    aliases: HashMap<String, String>,
}

impl ToolNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table of known upstream variants
    pub fn builtin() -> &'static ToolNameTable {
        &BUILTIN_TABLE
    }

    /// Register every variant for one canonical capability (builder pattern).
    ///
    /// The canonical name maps to itself so lookups of already-canonical
    /// names succeed.
    pub fn register_aliases(
        mut self,
        canonical: impl Into<String>,
        variants: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let canonical = canonical.into();
        for variant in variants {
            self.aliases.insert(variant.into(), canonical.clone());
        }
        self.aliases.insert(canonical.clone(), canonical);
        self
    }

    /// Canonical capability for an upstream name, if known
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Outcome of normalizing one upstream tool name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedToolName {
    pub original_name: String,
    pub normalized_name: String,
    pub tags: Vec<String>,
    pub scopes: Vec<String>,
}

/// Normalize an upstream tool name using the built-in table.
pub fn normalize_tool_name(
    upstream_name: &str,
    connector_id: &str,
    entry: &ConnectorEntry,
) -> NormalizedToolName {
    normalize_with_table(ToolNameTable::builtin(), upstream_name, connector_id, entry)
}

/// Normalize an upstream tool name against a specific alias table.
pub fn normalize_with_table(
    table: &ToolNameTable,
    upstream_name: &str,
    connector_id: &str,
    entry: &ConnectorEntry,
) -> NormalizedToolName {
    let normalized_name = canonical_name(table, upstream_name, connector_id);

    let (tags, scopes) = resolve_tools(entry)
        .into_iter()
        .find(|t| t.name == normalized_name)
        .map(|t| (t.tags, t.scopes))
        .unwrap_or_default();

    NormalizedToolName {
        original_name: upstream_name.to_string(),
        normalized_name,
        tags,
        scopes,
    }
}

/// Compute the canonical dotted name without the tag lookup.
pub fn canonical_name(table: &ToolNameTable, upstream_name: &str, connector_id: &str) -> String {
    let namespace = slug(connector_id);
    let trimmed = upstream_name.trim();

    // Already namespaced under this connector: strip it before lookup.
    let bare = match trimmed.split_once('.') {
        Some((prefix, rest)) if slug(prefix) == namespace => rest,
        _ => trimmed,
    };

    match table.resolve(&bare.to_ascii_lowercase()) {
        Some(canonical) => format!("{}.{}", namespace, canonical),
        None => format!("{}.{}", namespace, bare),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::entities::RemoteTool;

    fn wikidata() -> ConnectorEntry {
        ConnectorEntry::new("wikidata", "Wikidata").with_remote_tools(vec![
            RemoteTool::new("wikidata.get_entity_claims")
                .with_tags(["claims"])
                .with_scopes(["facts"]),
            RemoteTool::new("wikidata.execute_sparql").with_tags(["sparql", "query"]),
        ])
    }

    #[test]
    fn test_claims_variants_share_canonical_name() {
        let entry = wikidata();
        for upstream in ["get_entity_claims", "get_claims", "GET_CLAIMS", "wikidata.get_claims"] {
            let n = normalize_tool_name(upstream, "wikidata", &entry);
            assert_eq!(n.normalized_name, "wikidata.get_entity_claims", "{upstream}");
            assert_eq!(n.tags, vec!["claims"]);
            assert_eq!(n.scopes, vec!["facts"]);
        }
    }

    #[test]
    fn test_query_variants_share_canonical_name() {
        let entry = wikidata();
        let a = normalize_tool_name("execute_query", "wikidata", &entry);
        let b = normalize_tool_name("query", "wikidata", &entry);

        assert_eq!(a.normalized_name, "wikidata.execute_sparql");
        assert_eq!(a.normalized_name, b.normalized_name);
        assert_eq!(a.tags, vec!["sparql", "query"]);
        assert!(a.scopes.is_empty());
    }

    #[test]
    fn test_unknown_name_passes_through_namespaced() {
        let n = normalize_tool_name("lookup_labels", "wikidata", &wikidata());
        assert_eq!(n.original_name, "lookup_labels");
        assert_eq!(n.normalized_name, "wikidata.lookup_labels");
        assert!(n.tags.is_empty());
        assert!(n.scopes.is_empty());
    }

    #[test]
    fn test_foreign_namespace_is_kept() {
        let n = normalize_tool_name("other.get_claims", "wikidata", &wikidata());
        assert_eq!(n.normalized_name, "wikidata.other.get_claims");
    }

    #[test]
    fn test_tags_from_synthesized_tools() {
        let entry = ConnectorEntry::new("wikidata", "Wikidata");
        let n = normalize_tool_name("search_items", "wikidata", &entry);
        assert_eq!(n.normalized_name, "wikidata.vector_search_items");
        assert!(n.tags.iter().any(|t| t == "vector"));
    }

    #[test]
    fn test_custom_table() {
        let table = ToolNameTable::new().register_aliases("lookup", ["find", "fetch"]);
        assert_eq!(table.resolve("fetch"), Some("lookup"));
        assert_eq!(table.resolve("lookup"), Some("lookup"));
        assert_eq!(canonical_name(&table, "find", "acme"), "acme.lookup");
        assert_eq!(table.len(), 3);
    }
}
