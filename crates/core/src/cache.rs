use crate::embeddings::Embedder;
use crate::error::EmbeddingError;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Hex SHA-256 of the text, the cache key for its embedding.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Memoizes provider embeddings by content fingerprint.
///
/// Entries are written once per fingerprint and never evicted. The lock is
/// not held across the provider call, so two concurrent misses on the same
/// text may both reach the provider; the later write wins.
pub struct EmbeddingCache<E> {
    embedder: E,
    entries: RwLock<HashMap<String, Arc<[f32]>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<E: Embedder> EmbeddingCache<E> {
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }

    pub async fn get_or_compute(&self, text: &str) -> Result<Arc<[f32]>, EmbeddingError> {
        let key = fingerprint(text);
        if let Some(found) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(found);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let vector = self.embedder.embed(text).await?;
        let expected = self.embedder.dimensions();
        if vector.len() != expected {
            return Err(EmbeddingError::Dimension {
                expected,
                actual: vector.len(),
            });
        }

        let vector: Arc<[f32]> = vector.into();
        debug!(fingerprint = %key, "cached new embedding");
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key, Arc::clone(&vector));
        Ok(vector)
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lookup(&fingerprint(text)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn lookup(&self, key: &str) -> Option<Arc<[f32]>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}
