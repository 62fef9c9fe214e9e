//! Confirming a previewed import.

use shelfwise_catalog::types::ImportLog;
use shelfwise_db::{Connection, insert_import_log};

use crate::batch::{
    BatchOperationResult, BatchOptions, ConfirmRequest, ConflictDecision, CreateDecision,
    LinkDecision, execute_decisions,
};
use crate::error::ImportError;
use crate::progress::ImportProgress;
use crate::reconcile::{ImportPreview, MatchCategory};

/// Decisions that accept a preview as-is.
///
/// Matches are linked, conflicts are linked keeping the catalog's reading
/// level, and new books are created. Possible matches need a human call and
/// are left out, as are books already in the library.
pub fn default_decisions(preview: &ImportPreview) -> ConfirmRequest {
    let matched = preview
        .matched
        .iter()
        .filter_map(|entry| match &entry.category {
            MatchCategory::Matched { existing_id } => Some(LinkDecision {
                existing_book_id: existing_id.clone(),
            }),
            _ => None,
        })
        .collect();
    let conflicts = preview
        .conflicts
        .iter()
        .filter_map(|entry| match &entry.category {
            MatchCategory::Conflict { existing_id, details } => Some(ConflictDecision {
                existing_book_id: existing_id.clone(),
                update_reading_level: false,
                new_reading_level: Some(details.imported_reading_level.clone()),
            }),
            _ => None,
        })
        .collect();
    let new_books = preview
        .new_books
        .iter()
        .map(|entry| CreateDecision {
            title: entry.candidate.title.trim().to_string(),
            author: entry.candidate.author.clone(),
            reading_level: entry.candidate.reading_level.clone(),
        })
        .collect();

    ConfirmRequest {
        matched,
        new_books,
        conflicts,
    }
}

/// Reject malformed confirm payloads before any write.
pub fn validate_request(organization_id: &str, request: &ConfirmRequest) -> Result<(), ImportError> {
    if organization_id.trim().is_empty() {
        return Err(ImportError::validation("organization id is required"));
    }
    if request.is_empty() {
        return Err(ImportError::validation("no decisions were provided"));
    }
    if let Some(i) = request
        .matched
        .iter()
        .position(|m| m.existing_book_id.trim().is_empty())
    {
        return Err(ImportError::validation(format!(
            "matched[{i}] is missing existingBookId"
        )));
    }
    if let Some(i) = request.new_books.iter().position(|b| b.title.trim().is_empty()) {
        return Err(ImportError::validation(format!("newBooks[{i}] is missing a title")));
    }
    for (i, conflict) in request.conflicts.iter().enumerate() {
        if conflict.existing_book_id.trim().is_empty() {
            return Err(ImportError::validation(format!(
                "conflicts[{i}] is missing existingBookId"
            )));
        }
        let has_level = conflict
            .new_reading_level
            .as_deref()
            .is_some_and(|l| !l.trim().is_empty());
        if conflict.update_reading_level && !has_level {
            return Err(ImportError::validation(format!(
                "conflicts[{i}] asks to update the reading level but gives none"
            )));
        }
    }
    Ok(())
}

/// Apply confirmed decisions for an organization.
///
/// Only validation errors are returned as `Err`. Write failures, including
/// books that disappeared since the preview, are reported in the result's
/// `errors` list. A summary row is written to the import log afterwards.
pub fn confirm_import(
    conn: &Connection,
    organization_id: &str,
    source_name: &str,
    request: &ConfirmRequest,
    options: &BatchOptions,
    progress: &dyn ImportProgress,
) -> Result<BatchOperationResult, ImportError> {
    validate_request(organization_id, request)?;

    let decisions = request.decisions();
    log::info!(
        "Confirming {} decisions for organization {}",
        decisions.len(),
        organization_id
    );
    let result = execute_decisions(conn, organization_id, &decisions, options, progress);

    if let Err(e) = log_import(conn, organization_id, "confirm", source_name, &result) {
        log::warn!("Failed to record import log: {e}");
    }
    Ok(result)
}

/// Record a summary of an import run. Returns the log entry's id.
pub fn log_import(
    conn: &Connection,
    organization_id: &str,
    source_type: &str,
    source_name: &str,
    result: &BatchOperationResult,
) -> Result<i64, ImportError> {
    let entry = ImportLog {
        id: 0,
        organization_id: organization_id.to_string(),
        source_type: source_type.to_string(),
        source_name: source_name.to_string(),
        imported_at: chrono::Utc::now().to_rfc3339(),
        records_linked: result.linked as i64,
        records_created: result.created as i64,
        records_updated: result.updated as i64,
        errors: result.errors.len() as i64,
    };
    let id = insert_import_log(conn, &entry)?;
    Ok(id)
}
