//! Error types for the ingestion and enrichment pipeline.

use thiserror::Error;

/// Errors that can occur during ingestion, enrichment, or cover
/// maintenance.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// An external metadata source returned an HTTP error status.
    #[error("HTTP error from {source_name}: {message}")]
    Http {
        source_name: String,
        message: String,
    },

    /// An external metadata source asked us to slow down.
    #[error("rate limited by {source_name}")]
    RateLimited { source_name: String },

    /// A response from an external source could not be parsed.
    #[error("parse error from {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// A request failed before a status was received (DNS, connect,
    /// timeout).
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// An error propagated from the catalog store.
    #[error("database error: {0}")]
    Database(#[from] colophon_core::Error),

    /// An I/O error while persisting a downloaded asset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnrichError {
    /// Returns `true` for failures worth retrying on a later run.
    ///
    /// Transient failures leave the record untouched, so it stays
    /// eligible for the next enrichment batch.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::RateLimited { .. } | Self::Request(_)
        )
    }
}

/// Result type for enrichment operations.
pub type EnrichResult<T> = std::result::Result<T, EnrichError>;
