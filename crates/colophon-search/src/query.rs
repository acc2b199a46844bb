//! Semantic query execution.

use colophon_core::model::Book;
use colophon_core::schema::Database;

use crate::embedder::Embedder;
use crate::error::SearchResult;

/// Number of hits returned when the caller does not ask for a limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// One ranked search hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub book: Book,
    /// Cosine similarity between the query and the record, in
    /// `[-1.0, 1.0]`, higher is closer.
    pub score: f32,
}

/// Rank catalog records against a free-text query.
///
/// Embeds the query with the same model the index was built with and
/// scans every stored vector. Records without a vector are invisible
/// to search until the next reindex.
///
/// # Errors
/// Returns an error when the query cannot be embedded or the scan
/// fails.
pub fn search(
    db: &Database,
    embedder: &dyn Embedder,
    query: &str,
    limit: usize,
) -> SearchResult<Vec<SearchHit>> {
    log::debug!("Searching for: {query}");
    let vector = embedder.embed(query)?;
    let ranked = db.nearest_by_embedding(&vector, limit)?;

    Ok(ranked
        .into_iter()
        .map(|(book, score)| SearchHit { book, score })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::index::{reindex, ReindexScope};
    use colophon_core::model::NewBook;

    #[derive(Debug)]
    struct StubEmbedder;

    impl Embedder for StubEmbedder {
        fn dimension(&self) -> usize {
            3
        }

        fn embed(&self, text: &str) -> SearchResult<Vec<f32>> {
            let lower = text.to_lowercase();
            if lower.is_empty() {
                return Err(SearchError::Inference {
                    message: "cannot embed empty text".to_string(),
                });
            }
            let sea = if lower.contains("mare") { 1.0 } else { 0.0 };
            let hills = if lower.contains("montagna") { 1.0 } else { 0.0 };
            Ok(vec![sea, hills, 1.0])
        }
    }

    fn indexed_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        for title in ["Racconti del mare", "Storie di montagna", "Vita in città"] {
            db.insert_book(&NewBook::new(title, "Autore", "Italian", "Ebook"))
                .unwrap();
        }
        reindex(&db, &StubEmbedder, ReindexScope::All).unwrap();
        db
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let db = indexed_db();

        let hits = search(&db, &StubEmbedder, "il mare d'inverno", DEFAULT_SEARCH_LIMIT).unwrap();

        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].book.title, "Racconti del mare");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_search_respects_limit() {
        let db = indexed_db();

        let hits = search(&db, &StubEmbedder, "montagna", 1).unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].book.title, "Storie di montagna");
    }

    #[test]
    fn test_search_skips_unindexed_records() {
        let db = indexed_db();
        db.insert_book(&NewBook::new("Senza vettore", "Autore", "Italian", "Ebook"))
            .unwrap();

        let hits = search(&db, &StubEmbedder, "mare", 10).unwrap();

        assert!(hits.iter().all(|hit| hit.book.title != "Senza vettore"));
    }

    #[test]
    fn test_search_empty_catalog_returns_nothing() {
        let db = Database::open_in_memory().unwrap();
        let hits = search(&db, &StubEmbedder, "mare", DEFAULT_SEARCH_LIMIT).unwrap();
        assert!(hits.is_empty());
    }
}
