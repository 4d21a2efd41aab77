pub mod cache;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod indexer;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod retriever;
pub mod snippet;
pub mod store;
pub mod stores;
pub mod traits;

pub use cache::{fingerprint, EmbeddingCache};
pub use embeddings::{
    CharacterNgramEmbedder, Embedder, GeminiEmbedder, DEFAULT_EMBEDDING_DIMENSIONS,
    DEFAULT_GEMINI_MODEL,
};
pub use error::{EmbeddingError, ExtractionError, IndexError, QueryError, StoreError};
pub use extractor::{LopdfExtractor, PdfExtractor};
pub use indexer::Indexer;
pub use ingest::{
    collect_upload_paths, contract_id_from_filename, discover_pdf_files, load_contracts,
    read_contract, SkippedUpload, UploadBatch,
};
pub use models::{
    snippet_id, ContractDocument, FailureKind, IndexFailure, IndexReport, SearchResponse,
    SearchResult, Snippet, SnippetMetadata, StoreMatch,
};
pub use orchestrator::ClauseSearch;
pub use retriever::Retriever;
pub use snippet::{locate, parse_keywords, KeywordPattern, LEADING_CONTEXT_CHARS, TRAILING_CONTEXT_CHARS};
pub use stores::{InMemoryVectorStore, PineconeStore, QdrantStore};
pub use traits::VectorStore;
