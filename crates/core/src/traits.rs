use crate::models::{SnippetMetadata, StoreMatch};
use crate::StoreError;
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts or overwrites the vector stored under `id`.
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        metadata: &SnippetMetadata,
    ) -> Result<(), StoreError>;

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<StoreMatch>, StoreError>;

    /// Total number of stored vectors.
    async fn count(&self) -> Result<usize, StoreError>;

    /// Whether `query` results arrive sorted by descending score.
    fn ranks_results(&self) -> bool {
        true
    }
}
