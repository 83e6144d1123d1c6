use thiserror::Error;

/// Failures while talking to the Azure OpenAI embedding endpoint.
///
/// Shared between build-time and query-time callers; each side wraps it in
/// its own error with the propagation policy that side requires.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding configuration invalid: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding batch {batch} failed: {details}")]
    Batch { batch: usize, details: String },
}

/// Strict build-time errors: anything here aborts the index build before
/// artifacts are swapped into place.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("invalid build input: {0}")]
    InvalidInput(String),

    #[error("embedding dimension mismatch at row {row}: expected {expected}, found {found}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("corrupt index file: {0}")]
    CorruptIndex(String),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

/// Query-time errors. These never escape the retriever boundary: the
/// retriever converts them into renderable placeholder strings.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("index not loaded: {0}")]
    NotReady(String),

    #[error("query vector dimension {found} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

pub type Result<T, E = IndexError> = std::result::Result<T, E>;
