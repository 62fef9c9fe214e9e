use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;
use shelfwise_import::{BatchOptions, LogProgress};

use crate::CliError;

use super::{describe, open_catalog, print_json, source_name};

pub(crate) fn run_bulk_add(
    db_path: &Path,
    organization_id: &str,
    file: &Path,
    options: &BatchOptions,
    json: bool,
) -> Result<(), CliError> {
    let books =
        shelfwise_catalog::load_books_csv(file).map_err(|e| CliError::input(e.to_string()))?;
    let conn = open_catalog(db_path)?;
    let result = shelfwise_import::bulk_add(
        &conn,
        organization_id,
        &source_name(file),
        books,
        options,
        &LogProgress,
    )
    .map_err(|e| CliError::import(e.to_string()))?;

    if json {
        return print_json(&result);
    }

    crate::log_blank();
    log::info!(
        "{}",
        format!("Added {} of {} books", result.imported, result.total)
            .if_supports_color(Stderr, |t| t.bold()),
    );
    for book in &result.books {
        log::info!(
            "  {} [{}]",
            describe(&book.title, book.author.as_deref()),
            book.id.if_supports_color(Stderr, |t| t.dimmed()),
        );
    }
    if result.duplicates > 0 {
        log::info!("  Skipped {} duplicates", result.duplicates);
    }
    for error in &result.errors {
        log::warn!("  {:?} {}: {}", error.kind, error.key, error.error);
    }
    Ok(())
}
