//! In-memory search engine over a fixed document set.
//!
//! Used by the CLI and tests as a real [`SearchEngine`]; a production
//! deployment registers its own backends.

use std::cmp::Ordering;
use std::path::Path;

use async_trait::async_trait;

use super::models::{EngineQuery, SearchResult, SortOrder};
use crate::core::engines::{EngineError, SearchEngine};

pub struct InMemoryEngine {
    name: String,
    documents: Vec<SearchResult>,
}

impl InMemoryEngine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
        }
    }

    pub fn with_documents(mut self, documents: Vec<SearchResult>) -> Self {
        self.documents = documents;
        self
    }

    /// Load documents from a JSON array of results
    pub fn from_json_file(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Unavailable(format!("{}: {}", path.display(), e)))?;
        let documents: Vec<SearchResult> = serde_json::from_str(&content)
            .map_err(|e| EngineError::Backend(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(name).with_documents(documents))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn haystack(document: &SearchResult) -> String {
        let mut text = document.title.to_lowercase();
        for snippet in &document.highlights {
            text.push(' ');
            text.push_str(&snippet.to_lowercase());
        }
        for value in document.metadata.values() {
            if let Some(s) = value.as_str() {
                text.push(' ');
                text.push_str(&s.to_lowercase());
            }
        }
        text
    }

    /// Best fraction of phrasing tokens found in the document
    fn score(haystack: &str, query: &EngineQuery) -> f64 {
        query
            .all_phrasings()
            .map(|phrasing| {
                let tokens: Vec<String> = phrasing.split_whitespace().map(str::to_lowercase).collect();
                if tokens.is_empty() {
                    return 0.0;
                }
                let matched = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
                matched as f64 / tokens.len() as f64
            })
            .fold(0.0, f64::max)
    }
}

fn date_of(result: &SearchResult) -> &str {
    result.metadata_str("date").unwrap_or("")
}

fn sort_results(results: &mut [SearchResult], order: SortOrder) {
    match order {
        SortOrder::Relevance => results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        }),
        SortOrder::Newest => {
            results.sort_by(|a, b| date_of(b).cmp(date_of(a)).then_with(|| a.id.cmp(&b.id)))
        }
        SortOrder::Oldest => {
            results.sort_by(|a, b| date_of(a).cmp(date_of(b)).then_with(|| a.id.cmp(&b.id)))
        }
        SortOrder::Title => results.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id))),
    }
}

#[async_trait]
impl SearchEngine for InMemoryEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &EngineQuery) -> Result<Vec<SearchResult>, EngineError> {
        let mut results: Vec<SearchResult> = self
            .documents
            .iter()
            .filter(|doc| query.filters.matches(doc))
            .filter_map(|doc| {
                let score = Self::score(&Self::haystack(doc), query);
                (score > 0.0).then(|| SearchResult {
                    score,
                    ..doc.clone()
                })
            })
            .collect();

        sort_results(&mut results, query.sort);
        Ok(results)
    }
}
