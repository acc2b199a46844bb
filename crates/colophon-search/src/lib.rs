//! Vector search for colophon.
//!
//! Embeds catalog records with a multilingual sentence model and ranks
//! them by cosine similarity against free-text queries, straight from
//! the catalog store. The catalog is small enough that a brute-force
//! scan over stored vectors beats maintaining a separate vector index.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod embedder;
pub mod error;
pub mod index;
pub mod query;

pub use embedder::{embedding_text, Embedder, SentenceEmbedder, EMBEDDING_DIM};
pub use error::{SearchError, SearchResult};
pub use index::{reindex, ReindexReport, ReindexScope};
pub use query::{search, SearchHit, DEFAULT_SEARCH_LIMIT};
