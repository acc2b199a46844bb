//! Error types for embedding and search.

use thiserror::Error;

/// Errors that can occur while embedding or searching the catalog.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The embedding model could not be loaded or downloaded.
    #[error("embedding model error: {message}")]
    Model { message: String },

    /// The model failed to produce a vector for a text.
    #[error("embedding inference error: {message}")]
    Inference { message: String },

    /// A produced vector does not have the expected dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An error propagated from the catalog store.
    #[error("database error: {0}")]
    Database(#[from] colophon_core::Error),
}

/// Result type for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;
