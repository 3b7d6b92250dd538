//! Contextual enrichment queries
//!
//! The enrichment query always references the discovered entity; there is no
//! fixed query string.

use serde::{Deserialize, Serialize};

use crate::connector::RemoteTool;

/// Row limit applied to enrichment queries
pub const ENRICHMENT_ROW_LIMIT: usize = 25;

/// Structured query language spoken by an enrichment tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryLanguage {
    #[default]
    Sparql,
    Cypher,
}

impl QueryLanguage {
    pub fn as_str(&self) -> &str {
        match self {
            QueryLanguage::Sparql => "sparql",
            QueryLanguage::Cypher => "cypher",
        }
    }

    /// Infer the language from a tool's tags, then its name. Defaults to SPARQL.
    pub fn for_tool(tool: &RemoteTool) -> Self {
        if tool.has_tag("cypher") || tool.capability().contains("cypher") {
            QueryLanguage::Cypher
        } else {
            QueryLanguage::Sparql
        }
    }

    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("cypher") {
            QueryLanguage::Cypher
        } else {
            QueryLanguage::Sparql
        }
    }

    /// Build a query listing the outgoing statements of `entity_id`.
    pub fn build_query(&self, entity_id: &str) -> String {
        match self {
            QueryLanguage::Sparql => match sparql_subject(entity_id) {
                Some(subject) => format!(
                    "SELECT ?property ?value WHERE {{ {} ?property ?value . }} LIMIT {}",
                    subject, ENRICHMENT_ROW_LIMIT
                ),
                None => format!(
                    "SELECT ?property ?value WHERE {{ ?entity ?property ?value . FILTER(STR(?entity) = \"{}\") }} LIMIT {}",
                    escape_quotes(entity_id),
                    ENRICHMENT_ROW_LIMIT
                ),
            },
            QueryLanguage::Cypher => format!(
                "MATCH (e {{id: \"{}\"}})-[r]->(n) RETURN type(r) AS property, n AS value LIMIT {}",
                escape_quotes(entity_id),
                ENRICHMENT_ROW_LIMIT
            ),
        }
    }
}

fn is_wikibase_id(id: &str) -> bool {
    let mut chars = id.chars();
    matches!(chars.next(), Some('Q' | 'P' | 'L'))
        && id.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

/// A SPARQL term for the entity, or `None` when it must be matched by string.
fn sparql_subject(entity_id: &str) -> Option<String> {
    if is_wikibase_id(entity_id) {
        Some(format!("wd:{}", entity_id))
    } else if entity_id.starts_with("http://") || entity_id.starts_with("https://") {
        Some(format!("<{}>", entity_id.replace(['<', '>', ' '], "")))
    } else {
        None
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
