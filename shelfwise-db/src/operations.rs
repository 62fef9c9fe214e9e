//! Write operations for catalog books, selections, genres, and import logs.

use shelfwise_catalog::types::*;
use rusqlite::{Connection, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
}

impl OperationError {
    fn not_found(entity_type: &str, id: &str) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

// ── Book Operations ─────────────────────────────────────────────────────────

/// Insert a new catalog book.
pub fn insert_book(conn: &Connection, book: &CatalogBook) -> Result<(), OperationError> {
    let genre_ids = serde_json::to_string(&book.genre_ids)?;
    conn.execute(
        "INSERT INTO catalog_books (id, title, author, reading_level, age_range, genre_ids, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            book.id,
            book.title,
            book.author,
            book.reading_level,
            book.age_range,
            genre_ids,
            book.description,
        ],
    )?;
    Ok(())
}

/// Replace the editable fields of an existing book.
pub fn update_book(conn: &Connection, book: &CatalogBook) -> Result<(), OperationError> {
    let genre_ids = serde_json::to_string(&book.genre_ids)?;
    let changed = conn.execute(
        "UPDATE catalog_books SET
             title = ?2,
             author = ?3,
             reading_level = ?4,
             age_range = ?5,
             genre_ids = ?6,
             description = ?7,
             updated_at = datetime('now')
         WHERE id = ?1",
        params![
            book.id,
            book.title,
            book.author,
            book.reading_level,
            book.age_range,
            genre_ids,
            book.description,
        ],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("book", &book.id));
    }
    Ok(())
}

/// Overwrite a book's reading level.
pub fn update_reading_level(
    conn: &Connection,
    book_id: &str,
    reading_level: Option<&str>,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE catalog_books SET reading_level = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![book_id, reading_level],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found("book", book_id));
    }
    Ok(())
}

// ── Selection Operations ────────────────────────────────────────────────────

fn book_exists(conn: &Connection, book_id: &str) -> Result<bool, OperationError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM catalog_books WHERE id = ?1)",
        params![book_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Link a book to an organization, or reactivate an existing link.
///
/// Safe to repeat: a second call refreshes `updated_at` and sets
/// `is_available` rather than creating a second row.
pub fn upsert_selection(
    conn: &Connection,
    organization_id: &str,
    book_id: &str,
) -> Result<(), OperationError> {
    if !book_exists(conn, book_id)? {
        return Err(OperationError::not_found("book", book_id));
    }
    conn.execute(
        "INSERT INTO organization_selections (organization_id, book_id, is_available)
         VALUES (?1, ?2, 1)
         ON CONFLICT(organization_id, book_id) DO UPDATE SET
             is_available = 1,
             updated_at = datetime('now')",
        params![organization_id, book_id],
    )?;
    Ok(())
}

/// Link a freshly created book to an organization.
///
/// Fails on an existing link; use [`upsert_selection`] for books that may
/// already be linked.
pub fn insert_selection(
    conn: &Connection,
    organization_id: &str,
    book_id: &str,
) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO organization_selections (organization_id, book_id, is_available)
         VALUES (?1, ?2, 1)",
        params![organization_id, book_id],
    )?;
    Ok(())
}

/// Toggle whether a linked book is available to the organization.
pub fn set_availability(
    conn: &Connection,
    organization_id: &str,
    book_id: &str,
    is_available: bool,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE organization_selections SET is_available = ?3, updated_at = datetime('now')
         WHERE organization_id = ?1 AND book_id = ?2",
        params![organization_id, book_id, is_available],
    )?;
    if changed == 0 {
        return Err(OperationError::not_found(
            "selection",
            &format!("{organization_id}/{book_id}"),
        ));
    }
    Ok(())
}

// ── Genre Operations ────────────────────────────────────────────────────────

/// Insert or rename a genre.
pub fn upsert_genre(conn: &Connection, genre: &Genre) -> Result<(), OperationError> {
    conn.execute(
        "INSERT INTO genres (id, name) VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        params![genre.id, genre.name],
    )?;
    Ok(())
}

/// Load a genre dictionary into the database. Safe to call repeatedly.
pub fn seed_genres(conn: &Connection, genres: &[Genre]) -> Result<usize, OperationError> {
    let tx = conn.unchecked_transaction()?;
    for genre in genres {
        upsert_genre(&tx, genre)?;
    }
    tx.commit()?;
    Ok(genres.len())
}

// ── Import Log Operations ───────────────────────────────────────────────────

/// Insert an import log entry. Returns the generated ID.
pub fn insert_import_log(conn: &Connection, log: &ImportLog) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO import_log (organization_id, source_type, source_name, imported_at,
             records_linked, records_created, records_updated, errors)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            log.organization_id,
            log.source_type,
            log.source_name,
            log.imported_at,
            log.records_linked,
            log.records_created,
            log.records_updated,
            log.errors,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Chunked Batch Execution ─────────────────────────────────────────────────

/// A single atomic write, as planned by batch persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    InsertBook(CatalogBook),
    UpdateReadingLevel {
        book_id: String,
        reading_level: Option<String>,
    },
    UpsertSelection {
        organization_id: String,
        book_id: String,
    },
    InsertSelection {
        organization_id: String,
        book_id: String,
    },
}

impl WriteOp {
    /// Run this write against a connection (or open transaction).
    pub fn apply(&self, conn: &Connection) -> Result<(), OperationError> {
        match self {
            Self::InsertBook(book) => insert_book(conn, book),
            Self::UpdateReadingLevel {
                book_id,
                reading_level,
            } => update_reading_level(conn, book_id, reading_level.as_deref()),
            Self::UpsertSelection {
                organization_id,
                book_id,
            } => upsert_selection(conn, organization_id, book_id),
            Self::InsertSelection {
                organization_id,
                book_id,
            } => insert_selection(conn, organization_id, book_id),
        }
    }
}

/// Execute a chunk of writes as one transaction with per-statement results.
///
/// Each write runs inside its own savepoint, so a failing statement is rolled
/// back and reported without disturbing its neighbours. An `Err` return means
/// the chunk as a whole did not commit and none of its writes persisted.
pub fn execute_chunk(
    conn: &Connection,
    ops: &[WriteOp],
) -> Result<Vec<Result<(), OperationError>>, OperationError> {
    let tx = conn.unchecked_transaction()?;
    let mut outcomes = Vec::with_capacity(ops.len());

    for op in ops {
        tx.execute_batch("SAVEPOINT chunk_op")?;
        match op.apply(&tx) {
            Ok(()) => {
                tx.execute_batch("RELEASE chunk_op")?;
                outcomes.push(Ok(()));
            }
            Err(e) => {
                tx.execute_batch("ROLLBACK TO chunk_op; RELEASE chunk_op")?;
                outcomes.push(Err(e));
            }
        }
    }

    tx.commit()?;
    Ok(outcomes)
}
