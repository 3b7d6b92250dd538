//! JSON document store answering fallback searches by term overlap.
//!
//! Accepts either a bare array of documents or `{"documents": [...]}`.
//! Each document needs an `id`; `title` is optional and `content` defaults
//! to empty. Scores are the fraction of distinct query terms found in the
//! document. Ties keep file order.

use async_trait::async_trait;
use factlink_application::{FallbackError, LocalFallbackPort};
use factlink_domain::SearchHit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Terms shorter than this are ignored
const MIN_TERM_LEN: usize = 2;

/// One searchable document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackDocument {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoreFile {
    Bare(Vec<FallbackDocument>),
    Wrapped { documents: Vec<FallbackDocument> },
}

/// In-memory [`LocalFallbackPort`] loaded from a JSON file
#[derive(Debug, Clone)]
pub struct JsonFallbackStore {
    documents: Vec<(FallbackDocument, BTreeSet<String>)>,
    limit: usize,
}

fn terms(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}

impl JsonFallbackStore {
    pub fn from_documents(documents: Vec<FallbackDocument>, limit: usize) -> Self {
        let documents = documents
            .into_iter()
            .map(|doc| {
                let text = format!("{} {}", doc.title.as_deref().unwrap_or_default(), doc.content);
                let index = terms(&text);
                (doc, index)
            })
            .collect();
        Self { documents, limit }
    }

    pub fn load(path: &Path, limit: usize) -> Result<Self, FallbackError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FallbackError::Unavailable(format!("{}: {}", path.display(), e))
        })?;
        Self::parse(&content, limit)
    }

    pub fn parse(content: &str, limit: usize) -> Result<Self, FallbackError> {
        let file: StoreFile = serde_json::from_str(content)
            .map_err(|e| FallbackError::Unavailable(format!("invalid store file: {}", e)))?;
        let documents = match file {
            StoreFile::Bare(docs) | StoreFile::Wrapped { documents: docs } => docs,
        };
        Ok(Self::from_documents(documents, limit))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn rank(&self, query: &str) -> Vec<SearchHit> {
        let query_terms = terms(query);
        if query_terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &FallbackDocument)> = self
            .documents
            .iter()
            .filter_map(|(doc, index)| {
                let matched = query_terms.intersection(index).count();
                (matched > 0).then_some((matched, doc))
            })
            .collect();
        // Stable: equal scores keep file order
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        let total = query_terms.len() as f64;
        scored
            .into_iter()
            .take(self.limit)
            .map(|(matched, doc)| {
                let hit = SearchHit::new(doc.id.clone(), doc.content.clone())
                    .with_score(matched as f64 / total);
                match &doc.title {
                    Some(title) => hit.with_title(title.clone()),
                    None => hit,
                }
            })
            .collect()
    }
}

#[async_trait]
impl LocalFallbackPort for JsonFallbackStore {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, FallbackError> {
        let hits = self.rank(query);
        debug!(hits = hits.len(), documents = self.len(), "Local fallback search");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORE: &str = r#"[
        {"id": "meucci", "title": "Antonio Meucci", "content": "Developed a voice communication apparatus"},
        {"id": "bell", "title": "Alexander Graham Bell", "content": "Patented the telephone in 1876"},
        {"id": "gray", "title": "Elisha Gray", "content": "Filed a telephone caveat the same day"},
        {"id": "edison", "content": "Improved the telephone transmitter"}
    ]"#;

    #[tokio::test]
    async fn test_ranks_by_term_overlap() {
        let store = JsonFallbackStore::parse(STORE, 10).unwrap();
        let hits = store.search("who patented the telephone").await.unwrap();

        assert_eq!(hits[0].id, "bell");
        assert!(hits.iter().all(|h| h.id != "meucci"));
    }

    #[tokio::test]
    async fn test_ties_keep_file_order() {
        let store = JsonFallbackStore::parse(STORE, 10).unwrap();
        let hits = store.search("telephone").await.unwrap();

        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["bell", "gray", "edison"]);
    }

    #[tokio::test]
    async fn test_limit_and_empty_query() {
        let store = JsonFallbackStore::parse(STORE, 1).unwrap();
        assert_eq!(store.search("telephone").await.unwrap().len(), 1);
        assert!(store.search("?!").await.unwrap().is_empty());
    }

    #[test]
    fn test_wrapped_format() {
        let store =
            JsonFallbackStore::parse(r#"{"documents": [{"id": "a", "content": "x"}]}"#, 10)
                .unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let err = JsonFallbackStore::load(Path::new("/no/such/store.json"), 10).unwrap_err();
        assert!(matches!(err, FallbackError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, STORE).unwrap();

        let store = JsonFallbackStore::load(&path, 10).unwrap();
        assert_eq!(store.search("Meucci").await.unwrap()[0].id, "meucci");
    }
}
