//! Direct bulk add without the preview/confirm round trip.
//!
//! Every incoming book is checked against the catalog and against the books
//! already accepted from the same request; duplicates are dropped, the rest
//! are created and linked to the organization.

use serde::Serialize;
use shelfwise_catalog::types::{CatalogBook, NewBook};
use shelfwise_db::{Connection, WriteOp, all_books, get_book};

use crate::batch::{BatchError, BatchOptions, create_ops, run_plan};
use crate::confirm::log_import;
use crate::error::ImportError;
use crate::matching::NormalizedKey;
use crate::progress::ImportProgress;

/// Outcome of a bulk add.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAddResult {
    /// Books created in the catalog.
    pub imported: usize,
    /// Books dropped as duplicates of the catalog or of earlier rows.
    pub duplicates: usize,
    /// Books submitted.
    pub total: usize,
    /// The created books, as stored.
    pub books: Vec<CatalogBook>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BatchError>,
}

/// Add books to the catalog and link them to an organization.
pub fn bulk_add(
    conn: &Connection,
    organization_id: &str,
    source_name: &str,
    books: Vec<NewBook>,
    options: &BatchOptions,
    progress: &dyn ImportProgress,
) -> Result<BulkAddResult, ImportError> {
    if organization_id.trim().is_empty() {
        return Err(ImportError::validation("organization id is required"));
    }
    if books.is_empty() {
        return Err(ImportError::validation("no books were provided"));
    }

    let total = books.len();
    let catalog = all_books(conn)?;
    let mut known: Vec<NormalizedKey> = catalog.iter().map(NormalizedKey::of).collect();

    let mut duplicates = 0;
    let mut plan = Vec::new();
    for mut book in books {
        book.title = book.title.trim().to_string();
        if book.title.is_empty() {
            log::warn!("Skipping book with blank title");
            continue;
        }
        let key = NormalizedKey::of(&book);
        if known.iter().any(|existing| key.exact_match(existing)) {
            log::debug!("Skipping duplicate '{}'", book.title);
            duplicates += 1;
            continue;
        }
        known.push(key);
        plan.extend(create_ops(organization_id, book));
    }

    let (batch, succeeded) = run_plan(conn, &plan, options, progress);

    let mut created = Vec::with_capacity(batch.created);
    for (planned, ok) in plan.iter().zip(&succeeded) {
        if let (WriteOp::InsertBook(book), true) = (&planned.op, *ok) {
            created.push(stored_book(conn, book));
        }
    }

    if let Err(e) = log_import(conn, organization_id, "bulk_add", source_name, &batch) {
        log::warn!("Failed to record import log: {e}");
    }

    Ok(BulkAddResult {
        imported: created.len(),
        duplicates,
        total,
        books: created,
        errors: batch.errors,
    })
}

/// The created book as the database stored it, or as planned when the
/// read-back fails. The write has already committed at this point.
fn stored_book(conn: &Connection, planned: &CatalogBook) -> CatalogBook {
    match get_book(conn, &planned.id) {
        Ok(Some(book)) => book,
        Ok(None) => planned.clone(),
        Err(e) => {
            log::warn!("Failed to read back created book {}: {e}", planned.id);
            planned.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_back_failure_falls_back_to_planned_book() {
        // No schema, so the lookup itself errors.
        let conn = Connection::open_in_memory().unwrap();
        let planned = CatalogBook {
            id: "b1".into(),
            title: "Holes".into(),
            author: Some("Louis Sachar".into()),
            reading_level: None,
            age_range: None,
            genre_ids: vec![],
            description: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        assert_eq!(stored_book(&conn, &planned), planned);
    }

    #[test]
    fn read_back_returns_stored_row() {
        let conn = shelfwise_db::open_memory().unwrap();
        let mut planned = CatalogBook {
            id: "b1".into(),
            title: "Holes".into(),
            author: None,
            reading_level: None,
            age_range: None,
            genre_ids: vec![],
            description: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        shelfwise_db::insert_book(&conn, &planned).unwrap();
        planned.title = "Not what was stored".into();

        let stored = stored_book(&conn, &planned);
        assert_eq!(stored.title, "Holes");
        assert!(!stored.created_at.is_empty());
    }
}
