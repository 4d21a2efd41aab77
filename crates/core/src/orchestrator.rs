use crate::cache::EmbeddingCache;
use crate::embeddings::Embedder;
use crate::error::{IndexError, QueryError};
use crate::extractor::{LopdfExtractor, PdfExtractor};
use crate::indexer::Indexer;
use crate::models::{ContractDocument, IndexReport, SearchResponse};
use crate::retriever::Retriever;
use crate::traits::VectorStore;

/// Owns the embedding cache and store connection shared by indexing and
/// retrieval for the lifetime of the process.
pub struct ClauseSearch<E, S, X = LopdfExtractor> {
    extractor: X,
    cache: EmbeddingCache<E>,
    store: S,
}

impl<E, S> ClauseSearch<E, S, LopdfExtractor>
where
    E: Embedder,
    S: VectorStore,
{
    pub fn new(embedder: E, store: S) -> Self {
        Self::with_extractor(LopdfExtractor, embedder, store)
    }
}

impl<E, S, X> ClauseSearch<E, S, X>
where
    E: Embedder,
    S: VectorStore,
    X: PdfExtractor,
{
    pub fn with_extractor(extractor: X, embedder: E, store: S) -> Self {
        Self {
            extractor,
            cache: EmbeddingCache::new(embedder),
            store,
        }
    }

    pub fn cache(&self) -> &EmbeddingCache<E> {
        &self.cache
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn indexer(&self) -> Indexer<'_, X, E, S> {
        Indexer::new(&self.extractor, &self.cache, &self.store)
    }

    pub fn retriever(&self) -> Retriever<'_, E, S> {
        Retriever::new(&self.cache, &self.store)
    }

    pub async fn index(
        &self,
        documents: &[ContractDocument],
        keywords: &[String],
    ) -> Result<IndexReport, IndexError> {
        self.indexer().index(documents, keywords).await
    }

    pub async fn search(&self, query: &str, top_k: Option<usize>) -> Result<SearchResponse, QueryError> {
        self.retriever().search(query, top_k).await
    }
}
