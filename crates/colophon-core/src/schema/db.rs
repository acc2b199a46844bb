use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::embedding;
use crate::error::{Error, Result};
use crate::model::{Book, BookId, EnrichmentStatus, EnrichmentUpdate, NewBook};

use super::migrations::MIGRATIONS;

const BOOK_COLUMNS: &str = "id, title, author, description, publishing_house, published_date, \
                            cover_url, language, format, enrichment_status, embedding, \
                            created_at, updated_at";

/// Read-only catalog summary for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: i64,
    pub pending: i64,
    pub enriched: i64,
    pub not_found: i64,
    pub embedded: i64,
    pub local_covers: i64,
    pub remote_covers: i64,
}

/// A database connection with CRUD methods for catalog books.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        // Create migrations table if it doesn't exist
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        // Get applied migrations
        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        // Apply pending migrations
        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Book CRUD
impl Database {
    /// Insert a candidate record and return its store-assigned id.
    pub fn insert_book(&self, book: &NewBook) -> Result<BookId> {
        if book.title.trim().is_empty() {
            return Err(Error::InvalidData(
                "book title must not be empty".to_string(),
            ));
        }
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO books (
                title, author, description, publishing_house, published_date,
                cover_url, language, format, enrichment_status, embedding,
                created_at, updated_at
            ) VALUES (?1, ?2, NULL, ?3, NULL, NULL, ?4, ?5, ?6, NULL, ?7, ?7)",
            rusqlite::params![
                book.title,
                book.author,
                book.publishing_house,
                book.language,
                book.format,
                EnrichmentStatus::Pending.as_str(),
                now,
            ],
        )?;
        Ok(BookId::from_i64(self.conn.last_insert_rowid()))
    }

    /// Fetch a book by id.
    pub fn get_book(&self, id: BookId) -> Result<Book> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"))?;
        stmt.query_row([id.as_i64()], |row| self.row_to_book(row))
            .optional()?
            .ok_or_else(|| Error::NotFound {
                entity: "book",
                id: id.to_string(),
            })
    }

    /// List every book in natural (insertion) order.
    pub fn list_books(&self) -> Result<Vec<Book>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY id"))?;
        let books = stmt
            .query_map([], |row| self.row_to_book(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    /// List books that have never been enriched, oldest first.
    ///
    /// Selection is keyed on description nullness: a record holding the
    /// not-found sentinel is excluded exactly like an enriched one.
    pub fn list_missing_description(&self, limit: usize) -> Result<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE description IS NULL ORDER BY id LIMIT ?1"
        ))?;
        let books = stmt
            .query_map(
                [i64::try_from(limit).unwrap_or(i64::MAX)],
                |row| self.row_to_book(row),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    /// List books without a stored embedding, oldest first.
    pub fn list_missing_embedding(&self) -> Result<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE embedding IS NULL ORDER BY id"
        ))?;
        let books = stmt
            .query_map([], |row| self.row_to_book(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    /// List books whose cover URL matches a SQL LIKE pattern.
    pub fn list_books_with_cover_like(&self, pattern: &str) -> Result<Vec<Book>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE cover_url LIKE ?1 ORDER BY id"
        ))?;
        let books = stmt
            .query_map([pattern], |row| self.row_to_book(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    fn row_to_book(&self, row: &rusqlite::Row) -> rusqlite::Result<Book> {
        let status: String = row.get(9)?;
        let embedding = match row.get::<_, Option<Vec<u8>>>(10)? {
            Some(bytes) => Some(embedding::from_blob(&bytes).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    10,
                    rusqlite::types::Type::Blob,
                    e.to_string().into(),
                )
            })?),
            None => None,
        };

        Ok(Book {
            id: BookId::from_i64(row.get(0)?),
            title: row.get(1)?,
            author: row.get(2)?,
            description: row.get(3)?,
            publishing_house: row.get(4)?,
            published_date: row.get(5)?,
            cover_url: row.get(6)?,
            language: row.get(7)?,
            format: row.get(8)?,
            enrichment_status: EnrichmentStatus::parse(&status),
            embedding,
            created_at: parse_timestamp(11, &row.get::<_, String>(11)?)?,
            updated_at: parse_timestamp(12, &row.get::<_, String>(12)?)?,
        })
    }
}

// Enrichment write-backs
impl Database {
    /// Persist one successful provider match.
    ///
    /// The cover URL always overwrites (a match without an image clears
    /// any stale cover); the language only replaces the stored value
    /// when the provider supplied one. Clears the stored embedding: the
    /// description changed, so any previously computed vector no longer
    /// describes the record.
    pub fn apply_enrichment(&self, id: BookId, update: &EnrichmentUpdate) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE books SET
                description = ?2,
                publishing_house = ?3,
                published_date = ?4,
                cover_url = ?5,
                language = COALESCE(?6, language),
                enrichment_status = ?7,
                embedding = NULL,
                updated_at = ?8
             WHERE id = ?1",
            rusqlite::params![
                id.as_i64(),
                update.description,
                update.publishing_house,
                update.published_date,
                update.cover_url,
                update.language,
                EnrichmentStatus::Enriched.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "book",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Record that the provider had no match, writing the sentinel text
    /// into the description so later passes skip the record.
    pub fn mark_not_found(&self, id: BookId, sentinel: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE books SET
                description = ?2,
                enrichment_status = ?3,
                embedding = NULL,
                updated_at = ?4
             WHERE id = ?1",
            rusqlite::params![
                id.as_i64(),
                sentinel,
                EnrichmentStatus::NotFound.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "book",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Re-queue every not-found record for the next enrichment pass.
    ///
    /// Returns the number of records reset.
    pub fn reset_not_found(&self) -> Result<usize> {
        let changed = self.conn.execute(
            "UPDATE books SET
                description = NULL,
                enrichment_status = ?1,
                embedding = NULL,
                updated_at = ?2
             WHERE enrichment_status = ?3",
            rusqlite::params![
                EnrichmentStatus::Pending.as_str(),
                Utc::now().to_rfc3339(),
                EnrichmentStatus::NotFound.as_str(),
            ],
        )?;
        Ok(changed)
    }

    /// Replace a book's cover URL.
    pub fn update_cover_url(&self, id: BookId, cover_url: &str) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE books SET cover_url = ?2, updated_at = ?3 WHERE id = ?1",
            rusqlite::params![id.as_i64(), cover_url, Utc::now().to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "book",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

// Embedding storage and ranking
impl Database {
    /// Store a freshly computed embedding for a book.
    pub fn update_embedding(&self, id: BookId, vector: &[f32]) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE books SET embedding = ?2, updated_at = ?3 WHERE id = ?1",
            rusqlite::params![id.as_i64(), embedding::to_blob(vector), Utc::now().to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(Error::NotFound {
                entity: "book",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Rank embedded books by cosine similarity to the query vector.
    ///
    /// Returns at most `k` results, best match first; equal scores keep
    /// insertion order. Stored vectors whose dimension does not match
    /// the query are skipped with a warning.
    pub fn nearest_by_embedding(&self, query: &[f32], k: usize) -> Result<Vec<(Book, f32)>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE embedding IS NOT NULL ORDER BY id"
        ))?;
        let books = stmt
            .query_map([], |row| self.row_to_book(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut scored: Vec<(Book, f32)> = Vec::with_capacity(books.len());
        for book in books {
            let score = match book.embedding.as_deref() {
                Some(vector) if vector.len() == query.len() => {
                    embedding::cosine_similarity(query, vector)
                }
                Some(vector) => {
                    log::warn!(
                        "book {} has a {}-dim embedding, expected {}; skipping",
                        book.id,
                        vector.len(),
                        query.len()
                    );
                    continue;
                }
                None => continue,
            };
            scored.push((book, score));
        }

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        scored.truncate(k);
        Ok(scored)
    }
}

// Reporting
impl Database {
    /// Catalog summary counts.
    pub fn stats(&self) -> Result<CatalogStats> {
        let count = |sql: &str| -> Result<i64> {
            Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
        };
        Ok(CatalogStats {
            total: count("SELECT COUNT(*) FROM books")?,
            pending: count("SELECT COUNT(*) FROM books WHERE enrichment_status = 'pending'")?,
            enriched: count("SELECT COUNT(*) FROM books WHERE enrichment_status = 'enriched'")?,
            not_found: count("SELECT COUNT(*) FROM books WHERE enrichment_status = 'not_found'")?,
            embedded: count("SELECT COUNT(*) FROM books WHERE embedding IS NOT NULL")?,
            local_covers: count("SELECT COUNT(*) FROM books WHERE cover_url LIKE '/covers/%'")?,
            remote_covers: count("SELECT COUNT(*) FROM books WHERE cover_url LIKE 'http%'")?,
        })
    }
}

fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                e.to_string().into(),
            )
        })
}
