//! Embedding index maintenance.
//!
//! Walks catalog records, embeds each one's title and description, and
//! stores the vector on the record itself. A record failing never
//! aborts the pass.

use colophon_core::schema::Database;

use crate::embedder::{embedding_text, Embedder};
use crate::error::SearchResult;

/// Which records a reindex pass visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReindexScope {
    /// Only records without a stored vector. Enrichment clears the
    /// vector whenever it rewrites a description, so this picks up
    /// both new and re-enriched records.
    Missing,
    /// Every record, overwriting stored vectors.
    All,
}

/// Tallies for one reindex pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexReport {
    /// Records selected for this pass.
    pub examined: usize,
    /// Records whose vector was written.
    pub embedded: usize,
    /// Records skipped because embedding or the write failed.
    pub failed: usize,
}

/// Embed and store vectors for the records in `scope`.
///
/// # Errors
/// Returns an error only when the initial selection fails; per-record
/// failures are tallied in the report instead.
pub fn reindex(
    db: &Database,
    embedder: &dyn Embedder,
    scope: ReindexScope,
) -> SearchResult<ReindexReport> {
    let books = match scope {
        ReindexScope::Missing => db.list_missing_embedding()?,
        ReindexScope::All => db.list_books()?,
    };
    log::info!("Indexing {} records", books.len());

    let mut report = ReindexReport {
        examined: books.len(),
        ..ReindexReport::default()
    };

    for book in &books {
        let text = embedding_text(&book.title, book.description.as_deref());
        match embedder.embed(&text) {
            Ok(vector) => match db.update_embedding(book.id, &vector) {
                Ok(()) => {
                    log::debug!("Indexed \"{}\" ({})", book.title, book.id);
                    report.embedded += 1;
                }
                Err(e) => {
                    log::warn!(
                        "Could not store vector for \"{}\" ({}): {}",
                        book.title,
                        book.id,
                        e
                    );
                    report.failed += 1;
                }
            },
            Err(e) => {
                log::warn!(
                    "Embedding failed for \"{}\" ({}): {}",
                    book.title,
                    book.id,
                    e
                );
                report.failed += 1;
            }
        }
    }

    log::info!(
        "Indexing finished: {} embedded, {} failed",
        report.embedded,
        report.failed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use colophon_core::model::NewBook;

    /// Projects texts onto a tiny fixed plane so tests are
    /// deterministic without a real model.
    #[derive(Debug)]
    struct StubEmbedder;

    impl Embedder for StubEmbedder {
        fn dimension(&self) -> usize {
            3
        }

        fn embed(&self, text: &str) -> SearchResult<Vec<f32>> {
            let lower = text.to_lowercase();
            let sea = if lower.contains("mare") { 1.0 } else { 0.0 };
            let hills = if lower.contains("montagna") { 1.0 } else { 0.0 };
            Ok(vec![sea, hills, 1.0])
        }
    }

    /// Fails on texts containing "guasto", succeeds otherwise.
    #[derive(Debug)]
    struct FlakyEmbedder;

    impl Embedder for FlakyEmbedder {
        fn dimension(&self) -> usize {
            3
        }

        fn embed(&self, text: &str) -> SearchResult<Vec<f32>> {
            if text.contains("guasto") {
                return Err(SearchError::Inference {
                    message: "scripted failure".to_string(),
                });
            }
            Ok(vec![0.0, 0.0, 1.0])
        }
    }

    fn seeded_db(titles: &[&str]) -> Database {
        let db = Database::open_in_memory().unwrap();
        for title in titles {
            db.insert_book(&NewBook::new(*title, "Autore", "Italian", "Ebook"))
                .unwrap();
        }
        db
    }

    #[test]
    fn test_reindex_missing_visits_only_unembedded_records() {
        let db = seeded_db(&["Racconti del mare", "Storie di montagna"]);
        let already = db.list_books().unwrap()[0].id;
        db.update_embedding(already, &[9.0, 9.0, 9.0]).unwrap();

        let report = reindex(&db, &StubEmbedder, ReindexScope::Missing).unwrap();

        assert_eq!(report.examined, 1);
        assert_eq!(report.embedded, 1);
        assert_eq!(report.failed, 0);

        // The pre-embedded record keeps its vector.
        let books = db.list_books().unwrap();
        assert_eq!(books[0].embedding.as_deref(), Some([9.0, 9.0, 9.0].as_slice()));
        assert!(books[1].embedding.is_some());
    }

    #[test]
    fn test_reindex_all_overwrites_stale_vectors() {
        let db = seeded_db(&["Racconti del mare"]);
        let id = db.list_books().unwrap()[0].id;
        db.update_embedding(id, &[9.0, 9.0, 9.0]).unwrap();

        let report = reindex(&db, &StubEmbedder, ReindexScope::All).unwrap();

        assert_eq!(report.embedded, 1);
        let book = db.get_book(id).unwrap();
        assert_eq!(book.embedding.as_deref(), Some([1.0, 0.0, 1.0].as_slice()));
    }

    #[test]
    fn test_reindex_failure_does_not_abort_pass() {
        let db = seeded_db(&["Motore guasto", "Motore sano"]);

        let report = reindex(&db, &FlakyEmbedder, ReindexScope::Missing).unwrap();

        assert_eq!(report.examined, 2);
        assert_eq!(report.embedded, 1);
        assert_eq!(report.failed, 1);

        let books = db.list_books().unwrap();
        assert!(books[0].embedding.is_none());
        assert!(books[1].embedding.is_some());
    }

    #[test]
    fn test_reindex_empty_catalog_is_a_no_op() {
        let db = Database::open_in_memory().unwrap();
        let report = reindex(&db, &StubEmbedder, ReindexScope::All).unwrap();
        assert_eq!(report, ReindexReport::default());
    }
}
