use crate::cache::EmbeddingCache;
use crate::embeddings::Embedder;
use crate::error::QueryError;
use crate::models::{SearchResponse, SearchResult};
use crate::store::rank_matches;
use crate::traits::VectorStore;
use tracing::info;

pub struct Retriever<'a, E, S> {
    cache: &'a EmbeddingCache<E>,
    store: &'a S,
}

impl<'a, E, S> Retriever<'a, E, S>
where
    E: Embedder,
    S: VectorStore,
{
    pub fn new(cache: &'a EmbeddingCache<E>, store: &'a S) -> Self {
        Self { cache, store }
    }

    /// Nearest snippets for `query`, best first.
    ///
    /// Without `top_k` every stored snippet is ranked. Any failure fails the
    /// whole query; partial result sets are never returned.
    pub async fn search(&self, query: &str, top_k: Option<usize>) -> Result<SearchResponse, QueryError> {
        if query.trim().is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let top_k = match top_k {
            Some(top_k) => top_k,
            None => self.store.count().await?,
        };

        if top_k == 0 {
            return Ok(SearchResponse {
                query: query.to_string(),
                top_k,
                results: Vec::new(),
            });
        }

        let query_vector = self.cache.get_or_compute(query).await?;
        let mut matches = self.store.query(&query_vector, top_k).await?;

        if !self.store.ranks_results() {
            rank_matches(&mut matches);
        }
        matches.truncate(top_k);

        info!(query, top_k, returned = matches.len(), "search finished");

        Ok(SearchResponse {
            query: query.to_string(),
            top_k,
            results: matches.into_iter().map(SearchResult::from).collect(),
        })
    }
}
