//! Google Books metadata provider.
//!
//! Wraps the public volumes API behind the [`MetadataProvider`] trait
//! so the enrichment orchestrator can be driven by a scripted source
//! in tests. Each search asks for a single best match on title and
//! author; responses are reduced to the handful of fields the catalog
//! stores.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::enrich::resilience::RateLimiter;
use crate::error::{EnrichError, EnrichResult};

const GOOGLE_BOOKS_VOLUMES_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const SOURCE_NAME: &str = "Google Books";

/// Canonical high-resolution cover URL for a volume id.
///
/// The volumes API only hands out small thumbnails; this template
/// addresses the same frontcover at display size.
#[must_use]
pub fn cover_url_for_volume(volume_id: &str) -> String {
    format!(
        "https://books.google.com/books/publisher/content/images/frontcover/{volume_id}?fife=w600-h900&source=gbs_api"
    )
}

fn id_param_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // The pattern is a compile-time constant, so this cannot fail.
    PATTERN.get_or_init(|| Regex::new(r"id=([^&]+)").expect("id pattern is valid"))
}

fn frontcover_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // The pattern is a compile-time constant, so this cannot fail.
    PATTERN.get_or_init(|| Regex::new(r"frontcover/([^?]+)").expect("frontcover pattern is valid"))
}

/// Extract a Google Books volume id from a cover image URL.
///
/// Recognises both the thumbnail form (`...content?id=<volume>&...`)
/// and the frontcover template form (`...frontcover/<volume>?...`),
/// trying the `id=` query parameter first.
#[must_use]
pub fn extract_volume_id(url: &str) -> Option<String> {
    if let Some(captures) = id_param_pattern().captures(url) {
        return captures.get(1).map(|m| m.as_str().to_string());
    }
    frontcover_pattern()
        .captures(url)
        .and_then(|captures| captures.get(1).map(|m| m.as_str().to_string()))
}

/// Metadata carried by the best match of a provider search.
///
/// Every field is optional; the orchestrator substitutes fallbacks for
/// the ones it persists unconditionally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeMetadata {
    pub description: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    /// Volume id usable with [`cover_url_for_volume`]. Present only
    /// when the provider exposes cover imagery for the match.
    pub image_id: Option<String>,
    /// ISO language code as reported by the provider, original case.
    pub language: Option<String>,
}

/// Outcome of a provider search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The provider returned at least one volume; metadata of the first.
    Matched(VolumeMetadata),
    /// The provider returned no usable volume.
    NoMatch,
}

/// An external bibliographic metadata source.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search for the single best match of a title and author pair.
    ///
    /// # Errors
    /// Returns an error on HTTP failure or when the response cannot be
    /// parsed. "No result" is not an error; it is [`Lookup::NoMatch`].
    async fn search(&self, title: &str, author: &str) -> EnrichResult<Lookup>;
}

// Volumes API response types (only the fields enrichment reads).

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    id: String,
    #[serde(rename = "volumeInfo")]
    volume_info: Option<VolumeInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    description: Option<String>,
    publisher: Option<String>,
    published_date: Option<String>,
    language: Option<String>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

/// Reduce a volumes response to the outcome the orchestrator stores.
fn best_match(response: VolumesResponse) -> Lookup {
    let Some(volume) = response.items.into_iter().next() else {
        return Lookup::NoMatch;
    };
    let Some(info) = volume.volume_info else {
        return Lookup::NoMatch;
    };

    let has_cover = info
        .image_links
        .as_ref()
        .is_some_and(|links| links.thumbnail.is_some() || links.small_thumbnail.is_some());

    Lookup::Matched(VolumeMetadata {
        description: info.description,
        publisher: info.publisher,
        published_date: info.published_date,
        image_id: has_cover.then_some(volume.id),
        language: info.language,
    })
}

/// Google Books API client.
///
/// Owns its [`RateLimiter`] so every call made through this client is
/// paced, no matter which orchestrator drives it.
#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    http: Client,
    rate_limiter: RateLimiter,
}

impl GoogleBooksClient {
    /// Create a new Google Books client.
    ///
    /// `call_interval` is the pause enforced between consecutive API
    /// calls.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(call_interval: Duration) -> EnrichResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("colophon/0.1.0 (https://github.com/trnq/colophon)")
            .build()?;

        Ok(Self {
            http,
            rate_limiter: RateLimiter::new(call_interval),
        })
    }
}

#[async_trait]
impl MetadataProvider for GoogleBooksClient {
    async fn search(&self, title: &str, author: &str) -> EnrichResult<Lookup> {
        self.rate_limiter.acquire().await;

        let query = format!("intitle:{title}+inauthor:{author}");
        log::debug!("Querying {SOURCE_NAME}: {query}");

        let response = self
            .http
            .get(GOOGLE_BOOKS_VOLUMES_URL)
            .query(&[("q", query.as_str()), ("maxResults", "1")])
            .send()
            .await?;

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) if e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) => {
                return Err(EnrichError::RateLimited {
                    source_name: SOURCE_NAME.to_string(),
                });
            }
            Err(e) => {
                return Err(EnrichError::Http {
                    source_name: SOURCE_NAME.to_string(),
                    message: e.to_string(),
                });
            }
        };

        let volumes: VolumesResponse = response.json().await.map_err(|e| EnrichError::Parse {
            source_name: SOURCE_NAME.to_string(),
            message: e.to_string(),
        })?;

        Ok(best_match(volumes))
    }
}
