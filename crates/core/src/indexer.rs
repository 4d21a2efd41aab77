use crate::cache::EmbeddingCache;
use crate::embeddings::Embedder;
use crate::error::IndexError;
use crate::extractor::PdfExtractor;
use crate::models::{ContractDocument, FailureKind, IndexFailure, IndexReport};
use crate::snippet::KeywordPattern;
use crate::traits::VectorStore;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Extracts, embeds and upserts one snippet per (contract, keyword) pair.
pub struct Indexer<'a, X, E, S> {
    extractor: &'a X,
    cache: &'a EmbeddingCache<E>,
    store: &'a S,
}

impl<'a, X, E, S> Indexer<'a, X, E, S>
where
    X: PdfExtractor,
    E: Embedder,
    S: VectorStore,
{
    pub fn new(extractor: &'a X, cache: &'a EmbeddingCache<E>, store: &'a S) -> Self {
        Self {
            extractor,
            cache,
            store,
        }
    }

    /// Indexes the batch. Per-document and per-snippet failures are
    /// recorded in the report; only an unusable keyword fails the call.
    pub async fn index(
        &self,
        documents: &[ContractDocument],
        keywords: &[String],
    ) -> Result<IndexReport, IndexError> {
        let started_at = Utc::now();
        let patterns = compile_keywords(keywords)?;
        let documents = latest_uploads(documents);

        let mut indexed = Vec::new();
        let mut skipped = 0usize;
        let mut failures = Vec::new();

        for document in documents {
            let full_text = match self.extractor.extract_text(&document.bytes) {
                Ok(text) => text,
                Err(error) => {
                    warn!(contract_id = %document.contract_id, %error, "extraction failed");
                    failures.push(IndexFailure {
                        contract_id: document.contract_id.clone(),
                        keyword: None,
                        kind: FailureKind::Extraction,
                        reason: error.to_string(),
                    });
                    continue;
                }
            };

            for pattern in &patterns {
                let Some(snippet) = pattern.snippet(&document.contract_id, &full_text) else {
                    debug!(contract_id = %document.contract_id, keyword = pattern.keyword(), "no match");
                    skipped += 1;
                    continue;
                };

                let vector = match self.cache.get_or_compute(&snippet.text).await {
                    Ok(vector) => vector,
                    Err(error) => {
                        warn!(contract_id = %snippet.contract_id, keyword = %snippet.keyword, %error, "embedding failed");
                        failures.push(IndexFailure {
                            contract_id: snippet.contract_id,
                            keyword: Some(snippet.keyword),
                            kind: FailureKind::Embedding,
                            reason: error.to_string(),
                        });
                        continue;
                    }
                };

                let id = snippet.id();
                match self.store.upsert(&id, &vector, &snippet.metadata()).await {
                    Ok(()) => {
                        debug!(%id, fingerprint = %snippet.fingerprint, "snippet upserted");
                        indexed.push(id);
                    }
                    Err(error) => {
                        warn!(%id, %error, "upsert failed");
                        failures.push(IndexFailure {
                            contract_id: snippet.contract_id,
                            keyword: Some(snippet.keyword),
                            kind: FailureKind::Upsert,
                            reason: error.to_string(),
                        });
                    }
                }
            }
        }

        let report = IndexReport {
            indexed,
            skipped,
            failures,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            indexed = report.indexed_count(),
            skipped = report.skipped,
            extraction_failures = report.extraction_failures(),
            embedding_failures = report.embedding_failures(),
            upsert_failures = report.upsert_failures(),
            "indexing finished"
        );

        Ok(report)
    }
}

fn compile_keywords(keywords: &[String]) -> Result<Vec<KeywordPattern>, IndexError> {
    let mut patterns: Vec<KeywordPattern> = Vec::new();
    for keyword in keywords.iter().map(|keyword| keyword.trim()) {
        if keyword.is_empty() || patterns.iter().any(|known| known.keyword() == keyword) {
            continue;
        }
        let pattern = KeywordPattern::new(keyword).map_err(|source| IndexError::InvalidKeyword {
            keyword: keyword.to_string(),
            source,
        })?;
        patterns.push(pattern);
    }
    Ok(patterns)
}

/// One document per contract id; a later upload replaces an earlier one
/// but keeps the earlier position.
fn latest_uploads(documents: &[ContractDocument]) -> Vec<&ContractDocument> {
    let mut latest: Vec<&ContractDocument> = Vec::with_capacity(documents.len());
    for document in documents {
        match latest
            .iter_mut()
            .find(|known| known.contract_id == document.contract_id)
        {
            Some(slot) => *slot = document,
            None => latest.push(document),
        }
    }
    latest
}
