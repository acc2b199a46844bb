//! Cover image caching and maintenance.
//!
//! Downloads remote cover images into the statically served public
//! directory and rewrites provider thumbnail URLs through the
//! high-resolution frontcover template.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;

use colophon_core::model::{BookId, LOCAL_COVER_PREFIX};
use colophon_core::schema::Database;

use crate::error::EnrichResult;
use crate::provider::{cover_url_for_volume, extract_volume_id};

/// Bounded timeout for a single cover download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Local cache for remote cover images.
///
/// Files land at `<public_root>/covers/<book id>.jpg`, the layout the
/// collaborating HTTP layer serves statically.
#[derive(Debug, Clone)]
pub struct CoverStore {
    http: Client,
    public_root: PathBuf,
}

impl CoverStore {
    /// Create a cover store rooted at `public_root`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(public_root: PathBuf) -> EnrichResult<Self> {
        let http = Client::builder().timeout(DOWNLOAD_TIMEOUT).build()?;
        Ok(Self { http, public_root })
    }

    /// Download `url` and persist it under the book's canonical path.
    ///
    /// Returns the site-relative path on success. This never fails:
    /// any fetch, timeout, or write problem degrades to returning the
    /// original URL, which stays usable by clients.
    pub async fn cache(&self, url: &str, id: BookId) -> String {
        match self.try_cache(url, id).await {
            Ok(local_path) => local_path,
            Err(e) => {
                log::warn!(
                    "Cover download failed for book {}: {}; keeping remote URL",
                    id,
                    e
                );
                url.to_string()
            }
        }
    }

    async fn try_cache(&self, url: &str, id: BookId) -> EnrichResult<String> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let covers_dir = self.public_root.join("covers");
        tokio::fs::create_dir_all(&covers_dir).await?;

        let file_name = format!("{id}.jpg");
        tokio::fs::write(covers_dir.join(&file_name), &bytes).await?;

        Ok(format!("{LOCAL_COVER_PREFIX}/{file_name}"))
    }
}

/// Tallies for one cover migration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrateReport {
    /// Records with a remote cover URL at the start of the pass.
    pub total: usize,
    /// Covers now served from the local store.
    pub migrated: usize,
    /// Covers left on their remote URL.
    pub skipped: usize,
}

/// Move every remote cover into the local store.
///
/// Selects records whose cover URL is remote (`http...`), downloads
/// each image, and repoints the record at the local copy. A failed
/// download keeps the remote URL and counts as skipped, so the pass
/// can be re-run until it converges.
///
/// # Errors
/// Returns an error only when the initial selection fails.
pub async fn migrate_remote_covers(
    db: &Database,
    store: &CoverStore,
) -> EnrichResult<MigrateReport> {
    let books = db.list_books_with_cover_like("http%")?;
    log::info!("Found {} books with remote covers", books.len());

    let mut report = MigrateReport {
        total: books.len(),
        ..MigrateReport::default()
    };

    for book in &books {
        let Some(url) = book.cover_url.as_deref() else {
            continue;
        };

        let local = store.cache(url, book.id).await;
        if local.starts_with(LOCAL_COVER_PREFIX) {
            match db.update_cover_url(book.id, &local) {
                Ok(()) => report.migrated += 1,
                Err(e) => {
                    log::warn!(
                        "Could not repoint cover for \"{}\" ({}): {}",
                        book.title,
                        book.id,
                        e
                    );
                    report.skipped += 1;
                }
            }
        } else {
            report.skipped += 1;
        }

        let processed = report.migrated + report.skipped;
        if processed % 10 == 0 {
            log::info!("Progress: {}/{} covers processed", processed, report.total);
        }
    }

    log::info!(
        "Cover migration finished: {} migrated, {} skipped",
        report.migrated,
        report.skipped
    );
    Ok(report)
}

/// Tallies for one cover URL refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Records with a provider-hosted cover URL.
    pub total: usize,
    /// Records rewritten to the canonical frontcover form.
    pub updated: usize,
    /// Records left unchanged: already canonical, or no volume id.
    pub skipped: usize,
}

/// Rewrite provider cover URLs through the high-resolution template.
///
/// Pure store pass, no downloads: extracts the volume id from each
/// Google-hosted cover URL and replaces the URL when the canonical
/// form differs. URLs without a recognisable volume id are left alone,
/// as are URLs already in canonical form, so the pass is idempotent.
///
/// # Errors
/// Returns an error if the selection or any rewrite fails.
pub fn refresh_cover_urls(db: &Database) -> EnrichResult<RefreshReport> {
    let books = db.list_books_with_cover_like("%google.com%")?;
    log::info!("Found {} books with provider covers", books.len());

    let mut report = RefreshReport {
        total: books.len(),
        ..RefreshReport::default()
    };

    for book in &books {
        let Some(url) = book.cover_url.as_deref() else {
            continue;
        };
        let Some(volume_id) = extract_volume_id(url) else {
            log::debug!("No volume id in cover URL for \"{}\" ({})", book.title, book.id);
            report.skipped += 1;
            continue;
        };

        let canonical = cover_url_for_volume(&volume_id);
        if url == canonical {
            report.skipped += 1;
            continue;
        }

        db.update_cover_url(book.id, &canonical)?;
        report.updated += 1;
        if report.updated % 10 == 0 {
            log::info!("Updated {} covers", report.updated);
        }
    }

    log::info!(
        "Cover refresh finished: {} updated, {} skipped",
        report.updated,
        report.skipped
    );
    Ok(report)
}
