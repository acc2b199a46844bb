//! Enrichment batch orchestration.
//!
//! Selects records that have never been enriched, queries the metadata
//! provider once per record, and persists each outcome before moving
//! on. One record failing never aborts the batch; transient failures
//! leave the record eligible for the next run.

use colophon_core::model::{Book, EnrichmentUpdate};
use colophon_core::schema::Database;

use crate::error::EnrichResult;
use crate::provider::{cover_url_for_volume, Lookup, MetadataProvider};

/// Sentinel description stored when the provider has no match at all.
///
/// Writing it makes the record ineligible for later batches; `reset`
/// clears it to put those records back in the queue.
pub const NOT_FOUND_DESCRIPTION: &str = "Description not found on Google Books";

/// Description stored when a match carries no description of its own.
pub const NO_DESCRIPTION_FALLBACK: &str = "No available description";

/// Publisher stored when a match carries no publisher.
pub const UNKNOWN_PUBLISHER: &str = "Unknown";

/// Publication date stored when a match carries no date.
pub const UNDATED: &str = "N.D.";

/// Tallies for one enrichment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichReport {
    /// Records selected for this batch.
    pub examined: usize,
    /// Records updated from a provider match.
    pub enriched: usize,
    /// Records marked with the not-found sentinel.
    pub not_found: usize,
    /// Records left untouched because their lookup or write failed.
    pub failed: usize,
}

/// Per-record outcome, used for logging and tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Enriched,
    NotFound,
}

/// Sequential enrichment batch runner.
///
/// Deliberately single-threaded: one provider call in flight at a time
/// keeps pacing trivial, and each record is written before the next is
/// read. Two runners started concurrently against the same store can
/// still select the same record; nothing takes a per-record claim.
#[derive(Debug)]
pub struct Enricher<P> {
    provider: P,
    batch_size: usize,
}

impl<P: MetadataProvider> Enricher<P> {
    /// Create a runner that enriches at most `batch_size` records per
    /// run.
    #[must_use]
    pub fn new(provider: P, batch_size: usize) -> Self {
        Self {
            provider,
            batch_size,
        }
    }

    /// Run one enrichment batch.
    ///
    /// Selects up to `batch_size` records whose description is unset.
    /// Records that already carry a description, including the
    /// not-found sentinel, are never revisited, so re-running after a
    /// completed pass performs no provider calls and no writes.
    ///
    /// # Errors
    /// Returns an error only when the initial selection fails;
    /// per-record failures are tallied in the report instead.
    pub async fn run(&self, db: &Database) -> EnrichResult<EnrichReport> {
        let books = db.list_missing_description(self.batch_size)?;
        log::info!("Enriching {} records", books.len());

        let mut report = EnrichReport {
            examined: books.len(),
            ..EnrichReport::default()
        };

        for book in books {
            match self.enrich_book(db, &book).await {
                Ok(Outcome::Enriched) => {
                    log::info!("Enriched \"{}\" ({})", book.title, book.id);
                    report.enriched += 1;
                }
                Ok(Outcome::NotFound) => {
                    log::info!("No match for \"{}\" ({})", book.title, book.id);
                    report.not_found += 1;
                }
                Err(e) => {
                    let retry_hint = if e.is_transient() {
                        "; eligible again on the next run"
                    } else {
                        ""
                    };
                    log::warn!(
                        "Enrichment failed for \"{}\" ({}): {}{}",
                        book.title,
                        book.id,
                        e,
                        retry_hint
                    );
                    report.failed += 1;
                }
            }
        }

        log::info!(
            "Enrichment finished: {} enriched, {} not found, {} failed",
            report.enriched,
            report.not_found,
            report.failed
        );
        Ok(report)
    }

    async fn enrich_book(&self, db: &Database, book: &Book) -> EnrichResult<Outcome> {
        let title = search_title(&book.title);
        log::debug!("Looking up \"{}\" by {}", title, book.author);

        match self.provider.search(title, &book.author).await? {
            Lookup::Matched(found) => {
                let update = EnrichmentUpdate {
                    description: found
                        .description
                        .unwrap_or_else(|| NO_DESCRIPTION_FALLBACK.to_string()),
                    publishing_house: found
                        .publisher
                        .unwrap_or_else(|| UNKNOWN_PUBLISHER.to_string()),
                    published_date: found.published_date.unwrap_or_else(|| UNDATED.to_string()),
                    cover_url: found.image_id.as_deref().map(cover_url_for_volume),
                    language: found.language.map(|lang| lang.to_lowercase()),
                };
                db.apply_enrichment(book.id, &update)?;
                Ok(Outcome::Enriched)
            }
            Lookup::NoMatch => {
                db.mark_not_found(book.id, NOT_FOUND_DESCRIPTION)?;
                Ok(Outcome::NotFound)
            }
        }
    }
}

/// Derive the provider search title from a stored title.
///
/// Everything from the first parenthesis on is dropped, so series and
/// edition annotations do not poison the query.
#[must_use]
pub fn search_title(title: &str) -> &str {
    match title.split_once('(') {
        Some((head, _)) => head.trim(),
        None => title.trim(),
    }
}
