use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier for a catalog book.
///
/// Wraps the SQLite rowid; ordering follows insertion order, which is
/// the store's natural ordering for tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookId(i64);

impl BookId {
    #[must_use]
    pub const fn from_i64(id: i64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BookId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_id_round_trip() {
        let id = BookId::from_i64(42);
        assert_eq!(id.as_i64(), 42);
    }

    #[test]
    fn test_book_id_display() {
        let id = BookId::from_i64(7);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn test_book_id_ordering_follows_rowid() {
        let first = BookId::from_i64(1);
        let later = BookId::from_i64(9);
        assert!(first < later);
    }
}
