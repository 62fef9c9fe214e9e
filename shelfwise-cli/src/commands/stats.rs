use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::CliError;

use super::open_catalog;

pub(crate) fn run_stats(db_path: &Path, organization_id: Option<&str>) -> Result<(), CliError> {
    let conn = open_catalog(db_path)?;
    let stats = shelfwise_db::catalog_stats(&conn, organization_id)
        .map_err(|e| CliError::database(format!("Failed to query catalog stats: {}", e)))?;

    log::info!(
        "{}",
        "Catalog Database Statistics".if_supports_color(Stderr, |t| t.bold()),
    );
    log::info!("  Database: {}", db_path.display());
    if let Some(org) = organization_id {
        log::info!("  Organization: {}", org);
    }
    crate::log_blank();
    log::info!("  Books:               {:>8}", stats.books);
    log::info!("  Genres:              {:>8}", stats.genres);
    log::info!("  Linked (available):  {:>8}", stats.selections_available);
    log::info!("  Linked (withdrawn):  {:>8}", stats.selections_unavailable);
    log::info!("  Imports:             {:>8}", stats.imports);

    let Some(org) = organization_id else {
        return Ok(());
    };
    let logs = shelfwise_db::list_import_logs(&conn, org, Some(5))
        .map_err(|e| CliError::database(e.to_string()))?;
    if logs.is_empty() {
        return Ok(());
    }
    crate::log_blank();
    log::info!("{}", "Recent imports".if_supports_color(Stderr, |t| t.bold()));
    for entry in &logs {
        log::info!(
            "  {} {:<9} {:<24} +{} linked, +{} created, {} updated, {} errors",
            entry.imported_at.if_supports_color(Stderr, |t| t.dimmed()),
            entry.source_type,
            entry.source_name,
            entry.records_linked,
            entry.records_created,
            entry.records_updated,
            entry.errors,
        );
    }
    Ok(())
}
