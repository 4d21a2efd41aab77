use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("pdf parse error: {0}")]
    PdfParse(String),
}

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("embedding provider returned {status}: {details}")]
    Provider { status: u16, details: String },

    #[error("embedding dimension {actual} does not match expected {expected}")]
    Dimension { expected: usize, actual: usize },

    #[error("embedding provider returned an empty vector")]
    EmptyVector,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("vector dimension {actual} does not match store dimension {expected}")]
    Dimension { expected: usize, actual: usize },

    #[error("invalid snippet metadata for {id}: {details}")]
    InvalidMetadata { id: String, details: String },
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector store query failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid keyword {keyword:?}: {source}")]
    InvalidKeyword {
        keyword: String,
        #[source]
        source: regex::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
