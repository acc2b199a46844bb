//! Integration tests for the import → enrich flow.
//!
//! These tests drive the pipeline with a scripted metadata provider so
//! they run without real Google Books calls or network access.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use colophon_core::model::{EnrichmentStatus, NewBook};
use colophon_core::schema::Database;
use colophon_etl::{
    cover_url_for_volume, refresh_cover_urls, Config, CorpusParser, EnrichResult, Enricher,
    Lookup, MetadataProvider, VolumeMetadata,
};

/// Provider that replays a fixed queue of responses, then reports no
/// match.
#[derive(Debug)]
struct ScriptedProvider {
    responses: Mutex<VecDeque<Lookup>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<Lookup>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl MetadataProvider for ScriptedProvider {
    async fn search(&self, _title: &str, _author: &str) -> EnrichResult<Lookup> {
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Lookup::NoMatch))
    }
}

const CORPUS: &str = "\
Prime Reading

Il nome della rosa (Italian Edition)
Umberto Eco

ESTRATTO GRATUITO
Sample Title
Sample Author

Il deserto dei Tartari
Dino Buzzati
";

/// Importing the corpus and enriching it end to end leaves every
/// record in a terminal state and makes a second run a no-op.
#[tokio::test]
async fn test_import_then_enrich() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path().join("test.db")).unwrap();

    let parser = CorpusParser::new(&Config::default());
    for record in parser.candidates(CORPUS) {
        db.insert_book(&record).unwrap();
    }

    let books = db.list_books().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "Il nome della rosa");
    assert_eq!(books[0].language, "Italian");
    assert_eq!(books[1].title, "Il deserto dei Tartari");

    let provider = ScriptedProvider::new(vec![
        Lookup::Matched(VolumeMetadata {
            description: Some("Un giallo medievale.".to_string()),
            publisher: Some("Bompiani".to_string()),
            published_date: Some("1980".to_string()),
            image_id: Some("vol1".to_string()),
            language: Some("IT".to_string()),
        }),
        Lookup::NoMatch,
    ]);

    let report = Enricher::new(provider, 100).run(&db).await.unwrap();
    assert_eq!(report.examined, 2);
    assert_eq!(report.enriched, 1);
    assert_eq!(report.not_found, 1);

    let books = db.list_books().unwrap();
    assert_eq!(books[0].enrichment_status, EnrichmentStatus::Enriched);
    assert_eq!(
        books[0].description.as_deref(),
        Some("Un giallo medievale.")
    );
    assert_eq!(books[0].language, "it");
    assert_eq!(
        books[0].cover_url.as_deref(),
        Some(cover_url_for_volume("vol1").as_str())
    );
    assert_eq!(books[1].enrichment_status, EnrichmentStatus::NotFound);

    let stats = db.stats().unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.enriched, 1);
    assert_eq!(stats.not_found, 1);

    // Both records carry a description now, so nothing is selected.
    let second = Enricher::new(ScriptedProvider::new(Vec::new()), 100)
        .run(&db)
        .await
        .unwrap();
    assert_eq!(second.examined, 0);
}

/// Resetting not-found records puts them back in the enrichment queue.
#[tokio::test]
async fn test_reset_requeues_not_found_records() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path().join("test.db")).unwrap();

    db.insert_book(&NewBook::new("Introvabile", "Anonimo", "Italian", "Ebook"))
        .unwrap();

    let enricher = Enricher::new(ScriptedProvider::new(vec![Lookup::NoMatch]), 100);
    enricher.run(&db).await.unwrap();
    assert_eq!(db.stats().unwrap().not_found, 1);

    let reset = db.reset_not_found().unwrap();
    assert_eq!(reset, 1);

    let books = db.list_books().unwrap();
    assert!(books[0].description.is_none());
    assert_eq!(books[0].enrichment_status, EnrichmentStatus::Pending);

    // Back in the queue: the next run looks it up again.
    let report = enricher.run(&db).await.unwrap();
    assert_eq!(report.examined, 1);
}

/// Test database initialization and schema creation
#[test]
fn test_database_schema_creation() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    // Open database (should create schema)
    let db = Database::open(&db_path).expect("Failed to open database");

    let stats = db.stats().expect("Failed to read stats");
    assert_eq!(stats.total, 0);
    assert_eq!(stats.pending, 0);
}

/// Legacy thumbnail URLs from earlier imports are rewritten to the
/// high-resolution template by the refresh pass.
#[test]
fn test_legacy_cover_urls_are_normalised() {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path().join("test.db")).unwrap();

    let id = db
        .insert_book(&NewBook::new("Miniatura", "Autore", "Italian", "Ebook"))
        .unwrap();
    db.update_cover_url(
        id,
        "http://books.google.com/books/content?id=AbC123&printsec=frontcover&img=1",
    )
    .unwrap();

    let report = refresh_cover_urls(&db).unwrap();
    assert_eq!(report.updated, 1);

    assert_eq!(
        db.get_book(id).unwrap().cover_url.as_deref(),
        Some(cover_url_for_volume("AbC123").as_str())
    );
}
