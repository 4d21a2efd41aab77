use anyhow::{anyhow, Context};
use async_trait::async_trait;
use clause_radar_core::{
    CharacterNgramEmbedder, Embedder, EmbeddingError, GeminiEmbedder, InMemoryVectorStore,
    PineconeStore, QdrantStore, SnippetMetadata, StoreError, StoreMatch, VectorStore,
};

use crate::{Cli, EmbedderKind, StoreKind};

/// Provider picked at startup.
pub enum AnyEmbedder {
    Ngram(CharacterNgramEmbedder),
    Gemini(GeminiEmbedder),
}

impl AnyEmbedder {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        match cli.embedder {
            EmbedderKind::Ngram => Ok(Self::Ngram(CharacterNgramEmbedder {
                dimensions: cli.dimensions,
            })),
            EmbedderKind::Gemini => {
                let api_key = cli
                    .gemini_api_key
                    .clone()
                    .context("--gemini-api-key (GOOGLE_API_KEY) is required for the gemini embedder")?;
                Ok(Self::Gemini(GeminiEmbedder::new(
                    api_key,
                    cli.embedding_model.clone(),
                    cli.dimensions,
                )))
            }
        }
    }
}

#[async_trait]
impl Embedder for AnyEmbedder {
    fn dimensions(&self) -> usize {
        match self {
            Self::Ngram(embedder) => embedder.dimensions(),
            Self::Gemini(embedder) => embedder.dimensions(),
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self {
            Self::Ngram(embedder) => embedder.embed(text).await,
            Self::Gemini(embedder) => embedder.embed(text).await,
        }
    }
}

/// Store backend picked at startup.
pub enum AnyStore {
    Memory(InMemoryVectorStore),
    Qdrant(QdrantStore),
    Pinecone(PineconeStore),
}

impl AnyStore {
    pub async fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        match cli.store {
            StoreKind::Memory => Ok(Self::Memory(InMemoryVectorStore::new(cli.dimensions))),
            StoreKind::Qdrant => {
                let store = QdrantStore::new(&cli.qdrant_url, &cli.qdrant_collection, cli.dimensions);
                store
                    .ensure_collection()
                    .await
                    .map_err(|error| anyhow!(error.to_string()))?;
                Ok(Self::Qdrant(store))
            }
            StoreKind::Pinecone => {
                let host = cli
                    .pinecone_host
                    .as_deref()
                    .context("--pinecone-host (PINECONE_HOST) is required for the pinecone store")?;
                let api_key = cli
                    .pinecone_api_key
                    .clone()
                    .context("--pinecone-api-key (PINECONE_API_KEY) is required for the pinecone store")?;
                let store = PineconeStore::new(
                    host,
                    api_key,
                    cli.pinecone_namespace.clone(),
                    cli.dimensions,
                )?;
                Ok(Self::Pinecone(store))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Qdrant(_) => "qdrant",
            Self::Pinecone(_) => "pinecone",
        }
    }
}

#[async_trait]
impl VectorStore for AnyStore {
    async fn upsert(
        &self,
        id: &str,
        vector: &[f32],
        metadata: &SnippetMetadata,
    ) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.upsert(id, vector, metadata).await,
            Self::Qdrant(store) => store.upsert(id, vector, metadata).await,
            Self::Pinecone(store) => store.upsert(id, vector, metadata).await,
        }
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<StoreMatch>, StoreError> {
        match self {
            Self::Memory(store) => store.query(vector, top_k).await,
            Self::Qdrant(store) => store.query(vector, top_k).await,
            Self::Pinecone(store) => store.query(vector, top_k).await,
        }
    }

    async fn count(&self) -> Result<usize, StoreError> {
        match self {
            Self::Memory(store) => store.count().await,
            Self::Qdrant(store) => store.count().await,
            Self::Pinecone(store) => store.count().await,
        }
    }

    fn ranks_results(&self) -> bool {
        match self {
            Self::Memory(store) => store.ranks_results(),
            Self::Qdrant(store) => store.ranks_results(),
            Self::Pinecone(store) => store.ranks_results(),
        }
    }
}
