use crate::models::{SnippetMetadata, StoreMatch};
use crate::store::{check_dimension, rank_matches};
use crate::traits::VectorStore;
use crate::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Cosine similarity; 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    let mut dot = 0f64;
    let mut left_norm = 0f64;
    let mut right_norm = 0f64;
    for (a, b) in left.iter().zip(right.iter()) {
        let (a, b) = (f64::from(*a), f64::from(*b));
        dot += a * b;
        left_norm += a * a;
        right_norm += b * b;
    }

    if left_norm == 0.0 || right_norm == 0.0 {
        return 0.0;
    }
    dot / (left_norm.sqrt() * right_norm.sqrt())
}

struct StoredVector {
    vector: Vec<f32>,
    metadata: SnippetMetadata,
}

/// Process-local store with exact cosine search.
pub struct InMemoryVectorStore {
    vector_size: usize,
    entries: RwLock<BTreeMap<String, StoredVector>>,
}

impl InMemoryVectorStore {
    pub fn new(vector_size: usize) -> Self {
        Self {
            vector_size,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    pub fn metadata(&self, id: &str) -> Option<SnippetMetadata> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .map(|stored| stored.metadata.clone())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        metadata: &SnippetMetadata,
    ) -> Result<(), StoreError> {
        check_dimension(self.vector_size, vector)?;
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(
                id.to_string(),
                StoredVector {
                    vector: vector.to_vec(),
                    metadata: metadata.clone(),
                },
            );
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<StoreMatch>, StoreError> {
        check_dimension(self.vector_size, vector)?;
        let mut matches: Vec<StoreMatch> = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(|(id, stored)| StoreMatch {
                id: id.clone(),
                score: cosine_similarity(vector, &stored.vector),
                metadata: stored.metadata.clone(),
            })
            .collect();

        rank_matches(&mut matches);
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(contract_id: &str, text: &str) -> SnippetMetadata {
        SnippetMetadata {
            contract_id: contract_id.to_string(),
            keyword: "Term".to_string(),
            snippet_text: text.to_string(),
        }
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
    }

    #[tokio::test]
    async fn upsert_overwrites_same_id() -> Result<(), StoreError> {
        let store = InMemoryVectorStore::new(2);
        store.upsert("nda::Term", &[1.0, 0.0], &metadata("nda", "old")).await?;
        store.upsert("nda::Term", &[0.0, 1.0], &metadata("nda", "new")).await?;

        assert_eq!(store.count().await?, 1);
        assert_eq!(store.metadata("nda::Term").map(|m| m.snippet_text), Some("new".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn query_ranks_by_similarity_and_caps_at_top_k() -> Result<(), StoreError> {
        let store = InMemoryVectorStore::new(2);
        store.upsert("a::Term", &[1.0, 0.0], &metadata("a", "a")).await?;
        store.upsert("b::Term", &[0.7, 0.7], &metadata("b", "b")).await?;
        store.upsert("c::Term", &[0.0, 1.0], &metadata("c", "c")).await?;

        let matches = store.query(&[1.0, 0.1], 2).await?;
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "a::Term");
        assert_eq!(matches[1].id, "b::Term");

        let everything = store.query(&[1.0, 0.1], 50).await?;
        assert_eq!(everything.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let store = InMemoryVectorStore::new(3);
        let result = store.upsert("a::Term", &[1.0], &metadata("a", "a")).await;
        assert!(matches!(result, Err(StoreError::Dimension { expected: 3, actual: 1 })));
    }
}
