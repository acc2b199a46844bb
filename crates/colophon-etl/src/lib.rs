//! Ingestion and enrichment pipeline for colophon.
//!
//! The pipeline has three stages, each runnable on its own:
//!
//! - **corpus**: parse the flat text export of a reading list into
//!   catalog records
//! - **enrich**: fill in description, publisher, date, language, and
//!   cover URL from the Google Books volumes API
//! - **covers**: cache remote cover images locally and normalise
//!   provider URLs to the high-resolution template
//!
//! Stages communicate only through the catalog store, so a crashed or
//! interrupted run resumes by simply running the stage again.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod corpus;
pub mod covers;
pub mod enrich;
pub mod error;
pub mod provider;

pub use config::Config;
pub use corpus::{Candidates, CorpusParser};
pub use covers::{migrate_remote_covers, refresh_cover_urls, CoverStore, MigrateReport, RefreshReport};
pub use enrich::orchestrator::{search_title, EnrichReport, Enricher};
pub use enrich::resilience::RateLimiter;
pub use error::{EnrichError, EnrichResult};
pub use provider::{
    cover_url_for_volume, extract_volume_id, GoogleBooksClient, Lookup, MetadataProvider,
    VolumeMetadata,
};
