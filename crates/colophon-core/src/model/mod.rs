pub mod book;
pub mod ids;

pub use book::{Book, EnrichmentStatus, EnrichmentUpdate, NewBook, LOCAL_COVER_PREFIX};
pub use ids::BookId;
