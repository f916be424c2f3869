use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Index operation failed: {0}")]
    Index(String),

    #[error("Embedding dimension mismatch: index stores {found}, active model produces {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
