//! Read queries for the catalog database.
//!
//! A book whose stored `genre_ids` cannot be decoded is still returned by
//! catalog-wide lookups, with no genres, so matching sees its title and
//! author. Organization lists used for scoring leave such books out.

use std::collections::HashMap;

use shelfwise_catalog::types::*;
use rusqlite::{Connection, params};

use crate::operations::OperationError;

const BOOK_COLUMNS: &str = "b.id, b.title, b.author, b.reading_level, b.age_range,
                            b.genre_ids, b.description, b.created_at, b.updated_at";

// ── Book Lookups ────────────────────────────────────────────────────────────

/// Fetch the whole catalog in insertion order.
pub fn all_books(conn: &Connection) -> Result<Vec<CatalogBook>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOK_COLUMNS} FROM catalog_books b ORDER BY b.rowid"
    ))?;
    let rows = stmt.query_map([], row_to_book_lenient)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Fetch one book by id.
pub fn get_book(conn: &Connection, id: &str) -> Result<Option<CatalogBook>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOK_COLUMNS} FROM catalog_books b WHERE b.id = ?1"
    ))?;
    match stmt.query_row(params![id], row_to_book_lenient) {
        Ok(book) => Ok(Some(book)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Books currently available to an organization, in catalog order.
pub fn organization_books(
    conn: &Connection,
    organization_id: &str,
) -> Result<Vec<CatalogBook>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOK_COLUMNS}
         FROM catalog_books b
         JOIN organization_selections s ON s.book_id = b.id
         WHERE s.organization_id = ?1 AND s.is_available = 1
         ORDER BY b.rowid"
    ))?;
    let rows = stmt.query_map(params![organization_id], row_to_book)?;
    collect_books(rows)
}

// ── Selection Lookups ───────────────────────────────────────────────────────

/// All selections for an organization, available or not.
pub fn organization_selections(
    conn: &Connection,
    organization_id: &str,
) -> Result<Vec<OrganizationSelection>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, organization_id, book_id, is_available, created_at, updated_at
         FROM organization_selections WHERE organization_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![organization_id], row_to_selection)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Selections for an organization with `is_available` set.
pub fn available_selections(
    conn: &Connection,
    organization_id: &str,
) -> Result<Vec<OrganizationSelection>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, organization_id, book_id, is_available, created_at, updated_at
         FROM organization_selections
         WHERE organization_id = ?1 AND is_available = 1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![organization_id], row_to_selection)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Genre Queries ───────────────────────────────────────────────────────────

/// List the genre dictionary, sorted by name.
pub fn list_genres(conn: &Connection) -> Result<Vec<Genre>, OperationError> {
    let mut stmt = conn.prepare("SELECT id, name FROM genres ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Genre {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Map of genre id to display name.
pub fn genre_names(conn: &Connection) -> Result<HashMap<String, String>, OperationError> {
    Ok(list_genres(conn)?
        .into_iter()
        .map(|g| (g.id, g.name))
        .collect())
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Summary statistics for the catalog, optionally scoped to one organization.
#[derive(Debug, Default)]
pub struct CatalogStats {
    pub books: i64,
    pub genres: i64,
    pub selections_available: i64,
    pub selections_unavailable: i64,
    pub imports: i64,
}

/// Get catalog statistics. Selection and import counts cover every
/// organization unless `organization_id` is given.
pub fn catalog_stats(
    conn: &Connection,
    organization_id: Option<&str>,
) -> Result<CatalogStats, OperationError> {
    let books: i64 = conn.query_row("SELECT COUNT(*) FROM catalog_books", [], |r| r.get(0))?;
    let genres: i64 = conn.query_row("SELECT COUNT(*) FROM genres", [], |r| r.get(0))?;

    let count_selections = |available: bool| -> rusqlite::Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM organization_selections
             WHERE is_available = ?1 AND (?2 IS NULL OR organization_id = ?2)",
            params![available, organization_id],
            |r| r.get(0),
        )
    };
    let selections_available = count_selections(true)?;
    let selections_unavailable = count_selections(false)?;

    let imports: i64 = conn.query_row(
        "SELECT COUNT(*) FROM import_log WHERE ?1 IS NULL OR organization_id = ?1",
        params![organization_id],
        |r| r.get(0),
    )?;

    Ok(CatalogStats {
        books,
        genres,
        selections_available,
        selections_unavailable,
        imports,
    })
}

// ── Import Log Queries ──────────────────────────────────────────────────────

/// List recent import logs for an organization, newest first.
pub fn list_import_logs(
    conn: &Connection,
    organization_id: &str,
    limit: Option<u32>,
) -> Result<Vec<ImportLog>, OperationError> {
    let limit = limit.unwrap_or(20);
    let mut stmt = conn.prepare(&format!(
        "SELECT id, organization_id, source_type, source_name, imported_at,
                records_linked, records_created, records_updated, errors
         FROM import_log WHERE organization_id = ?1
         ORDER BY imported_at DESC, id DESC LIMIT {limit}"
    ))?;
    let rows = stmt.query_map(params![organization_id], |row| {
        Ok(ImportLog {
            id: row.get(0)?,
            organization_id: row.get(1)?,
            source_type: row.get(2)?,
            source_name: row.get(3)?,
            imported_at: row.get(4)?,
            records_linked: row.get(5)?,
            records_created: row.get(6)?,
            records_updated: row.get(7)?,
            errors: row.get(8)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<CatalogBook> {
    let raw_genres: String = row.get(5)?;
    let genre_ids: Vec<String> = serde_json::from_str(&raw_genres).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    book_from_row(row, genre_ids)
}

/// Like `row_to_book`, but a malformed genre list becomes an empty one.
fn row_to_book_lenient(row: &rusqlite::Row<'_>) -> rusqlite::Result<CatalogBook> {
    let raw_genres: String = row.get(5)?;
    let genre_ids = match serde_json::from_str::<Vec<String>>(&raw_genres) {
        Ok(ids) => ids,
        Err(e) => {
            let id: String = row.get(0)?;
            log::warn!("Catalog book {id} has malformed genre ids, treating as none: {e}");
            Vec::new()
        }
    };
    book_from_row(row, genre_ids)
}

fn book_from_row(row: &rusqlite::Row<'_>, genre_ids: Vec<String>) -> rusqlite::Result<CatalogBook> {
    Ok(CatalogBook {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        reading_level: row.get(3)?,
        age_range: row.get(4)?,
        genre_ids,
        description: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn row_to_selection(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrganizationSelection> {
    Ok(OrganizationSelection {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        book_id: row.get(2)?,
        is_available: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Collect book rows, skipping any whose genre list is malformed.
fn collect_books(
    rows: impl Iterator<Item = rusqlite::Result<CatalogBook>>,
) -> Result<Vec<CatalogBook>, OperationError> {
    let mut books = Vec::new();
    for row in rows {
        match row {
            Ok(book) => books.push(book),
            Err(rusqlite::Error::FromSqlConversionFailure(_, _, e)) => {
                log::warn!("Skipping catalog book with malformed genre ids: {e}");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(books)
}
