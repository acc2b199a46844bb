use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::BookId;

/// Prefix under which locally cached cover images are served.
pub const LOCAL_COVER_PREFIX: &str = "/covers";

/// Enrichment lifecycle of a record.
///
/// `NotFound` records carry the sentinel description and are skipped
/// by later enrichment passes until explicitly reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnrichmentStatus {
    Pending,
    Enriched,
    NotFound,
}

impl EnrichmentStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Enriched => "enriched",
            Self::NotFound => "not_found",
        }
    }

    /// Parse a stored status value, falling back to `Pending`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "enriched" => Self::Enriched,
            "not_found" => Self::NotFound,
            _ => Self::Pending,
        }
    }
}

/// A cataloged book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,

    /// Present once enrichment has run; holds the not-found sentinel
    /// when the provider had no match.
    pub description: Option<String>,

    pub publishing_house: Option<String>,
    pub published_date: Option<String>,

    /// Null, a local path under [`LOCAL_COVER_PREFIX`], or a remote
    /// absolute URL.
    pub cover_url: Option<String>,

    pub language: String,
    pub format: String,
    pub enrichment_status: EnrichmentStatus,

    /// Sentence embedding of title and description, when computed.
    pub embedding: Option<Vec<f32>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A candidate record produced by ingestion, before the store assigns
/// an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub language: String,
    pub format: String,
    pub publishing_house: Option<String>,
}

impl NewBook {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        language: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            language: language.into(),
            format: format.into(),
            publishing_house: None,
        }
    }

    #[must_use]
    pub fn with_publishing_house(mut self, publisher: impl Into<String>) -> Self {
        self.publishing_house = Some(publisher.into());
        self
    }
}

/// Field updates produced by one successful provider match.
///
/// Every field overwrites the stored value except `language`, which
/// only replaces it when the provider supplied one; a `cover_url` of
/// `None` clears any previously stored cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentUpdate {
    pub description: String,
    pub publishing_house: String,
    pub published_date: String,
    pub cover_url: Option<String>,
    pub language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_book_builder() {
        let book = NewBook::new("Il Gattopardo", "Tomasi di Lampedusa", "Italian", "Ebook")
            .with_publishing_house("Unknown");
        assert_eq!(book.title, "Il Gattopardo");
        assert_eq!(book.author, "Tomasi di Lampedusa");
        assert_eq!(book.language, "Italian");
        assert_eq!(book.format, "Ebook");
        assert_eq!(book.publishing_house.as_deref(), Some("Unknown"));
    }

    #[test]
    fn test_enrichment_status_round_trip() {
        for status in [
            EnrichmentStatus::Pending,
            EnrichmentStatus::Enriched,
            EnrichmentStatus::NotFound,
        ] {
            assert_eq!(EnrichmentStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn test_enrichment_status_parse_unknown_defaults_to_pending() {
        assert_eq!(
            EnrichmentStatus::parse("mystery"),
            EnrichmentStatus::Pending
        );
    }
}
