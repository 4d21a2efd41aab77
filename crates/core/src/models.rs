use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator between contract id and keyword in a snippet's store identity.
pub const SNIPPET_ID_SEPARATOR: &str = "::";

/// One uploaded contract: its id and the raw PDF bytes.
#[derive(Debug, Clone)]
pub struct ContractDocument {
    pub contract_id: String,
    pub bytes: Vec<u8>,
}

impl ContractDocument {
    pub fn new(contract_id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            contract_id: contract_id.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub contract_id: String,
    pub keyword: String,
    pub text: String,
    pub fingerprint: String,
}

impl Snippet {
    pub fn id(&self) -> String {
        snippet_id(&self.contract_id, &self.keyword)
    }

    pub fn metadata(&self) -> SnippetMetadata {
        SnippetMetadata {
            contract_id: self.contract_id.clone(),
            keyword: self.keyword.clone(),
            snippet_text: self.text.clone(),
        }
    }
}

pub fn snippet_id(contract_id: &str, keyword: &str) -> String {
    format!("{contract_id}{SNIPPET_ID_SEPARATOR}{keyword}")
}

/// Metadata stored next to every snippet vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetMetadata {
    pub contract_id: String,
    pub keyword: String,
    pub snippet_text: String,
}

/// A neighbour as returned by a vector store, metadata already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreMatch {
    pub id: String,
    pub score: f64,
    pub metadata: SnippetMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub contract_id: String,
    pub keyword: String,
    pub score: f64,
    pub snippet_text: String,
}

impl SearchResult {
    pub fn score_percent(&self) -> f64 {
        self.score * 100.0
    }

    /// Single-line preview; appends an ellipsis when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        let flat = self.snippet_text.replace('\n', " ");
        if flat.chars().count() <= max_chars {
            return flat;
        }

        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}…", cut.trim_end())
    }
}

impl From<StoreMatch> for SearchResult {
    fn from(value: StoreMatch) -> Self {
        Self {
            contract_id: value.metadata.contract_id,
            keyword: value.metadata.keyword,
            score: value.score,
            snippet_text: value.metadata.snippet_text,
        }
    }
}

/// Result set of one query, owned by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub top_k: usize,
    pub results: Vec<SearchResult>,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Extraction,
    Embedding,
    Upsert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFailure {
    pub contract_id: String,
    pub keyword: Option<String>,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexReport {
    /// Composite ids written to the store, in indexing order.
    pub indexed: Vec<String>,
    /// (document, keyword) pairs without a keyword match.
    pub skipped: usize,
    pub failures: Vec<IndexFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl IndexReport {
    pub fn indexed_count(&self) -> usize {
        self.indexed.len()
    }

    pub fn extraction_failures(&self) -> usize {
        self.failures_of(FailureKind::Extraction)
    }

    pub fn embedding_failures(&self) -> usize {
        self.failures_of(FailureKind::Embedding)
    }

    pub fn upsert_failures(&self) -> usize {
        self.failures_of(FailureKind::Upsert)
    }

    fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures
            .iter()
            .filter(|failure| failure.kind == kind)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_text(text: &str) -> SearchResult {
        SearchResult {
            contract_id: "nda".to_string(),
            keyword: "Term".to_string(),
            score: 0.9274,
            snippet_text: text.to_string(),
        }
    }

    #[test]
    fn snippet_id_joins_contract_and_keyword() {
        assert_eq!(snippet_id("nda-2024", "Payment Terms"), "nda-2024::Payment Terms");
    }

    #[test]
    fn preview_flattens_newlines_and_truncates() {
        let short = result_with_text("line one\nline two");
        assert_eq!(short.preview(80), "line one line two");

        let long = result_with_text(&"a".repeat(100));
        let preview = long.preview(80);
        assert!(preview.ends_with('…'));
        assert_eq!(preview.chars().count(), 81);
    }

    #[test]
    fn score_percent_scales_similarity() {
        let result = result_with_text("x");
        assert!((result.score_percent() - 92.74).abs() < 1e-9);
    }
}
