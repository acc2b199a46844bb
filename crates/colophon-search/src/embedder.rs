//! Sentence embedding for catalog records.
//!
//! Wraps a local ONNX sentence transformer behind the [`Embedder`]
//! trait so indexing and querying can be driven by a deterministic
//! stub in tests. The model is multilingual; the catalog mixes
//! Italian titles with descriptions in several languages.

use std::fmt;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::error::{SearchError, SearchResult};

/// Dimension of the vectors produced by the bundled model.
pub const EMBEDDING_DIM: usize = 384;

/// Build the text a record is embedded under: title plus description,
/// when one exists.
#[must_use]
pub fn embedding_text(title: &str, description: Option<&str>) -> String {
    format!("{} {}", title, description.unwrap_or_default())
        .trim()
        .to_string()
}

/// Maps a text to a fixed-dimension vector.
pub trait Embedder: Send + Sync {
    /// Dimension of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Embed one text.
    ///
    /// # Errors
    /// Returns an error when the text is empty or inference fails.
    fn embed(&self, text: &str) -> SearchResult<Vec<f32>>;
}

/// Embedder backed by the paraphrase-multilingual-MiniLM-L12-v2 model.
///
/// Construction loads the model into memory and downloads it into the
/// cache directory first if it is not there yet, so build one eagerly
/// at command startup rather than lazily mid-batch.
pub struct SentenceEmbedder {
    model: Mutex<TextEmbedding>,
}

impl SentenceEmbedder {
    /// Load the model, downloading it into `cache_dir` on first use.
    ///
    /// # Errors
    /// Returns an error when the model cannot be downloaded or loaded.
    pub fn new(cache_dir: &Path) -> SearchResult<Self> {
        log::info!(
            "Loading sentence embedding model (cache: {})",
            cache_dir.display()
        );
        let options = InitOptions::new(EmbeddingModel::ParaphraseMLMiniLML12V2)
            .with_cache_dir(cache_dir.to_path_buf())
            .with_show_download_progress(true);
        let model = TextEmbedding::try_new(options).map_err(|e| SearchError::Model {
            message: e.to_string(),
        })?;

        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

// `TextEmbedding` has no `Debug` impl, so describe the model instead.
impl fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field("model", &"paraphrase-multilingual-MiniLM-L12-v2")
            .field("dimension", &EMBEDDING_DIM)
            .finish()
    }
}

impl Embedder for SentenceEmbedder {
    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }

    fn embed(&self, text: &str) -> SearchResult<Vec<f32>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SearchError::Inference {
                message: "cannot embed empty text".to_string(),
            });
        }

        // One inference at a time; the batch stages are sequential anyway.
        let model = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        let mut vectors = model
            .embed(vec![trimmed], None)
            .map_err(|e| SearchError::Inference {
                message: e.to_string(),
            })?;

        let vector = vectors.pop().ok_or_else(|| SearchError::Inference {
            message: "model returned no vector".to_string(),
        })?;
        if vector.len() != EMBEDDING_DIM {
            return Err(SearchError::DimensionMismatch {
                expected: EMBEDDING_DIM,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_text_joins_title_and_description() {
        assert_eq!(
            embedding_text("Il nome della rosa", Some("Un giallo medievale.")),
            "Il nome della rosa Un giallo medievale."
        );
    }

    #[test]
    fn test_embedding_text_without_description() {
        assert_eq!(embedding_text("Il nome della rosa", None), "Il nome della rosa");
    }

    #[test]
    fn test_embedding_text_trims_edges() {
        assert_eq!(embedding_text("  Titolo  ", None), "Titolo");
        assert_eq!(embedding_text("Titolo", Some("")), "Titolo");
    }
}
