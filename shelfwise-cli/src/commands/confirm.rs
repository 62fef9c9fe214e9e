use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;
use shelfwise_import::{BatchOperationResult, BatchOptions, ConfirmRequest, LogProgress};

use crate::CliError;

use super::{open_catalog, print_json, source_name};

pub(crate) fn run_confirm(
    db_path: &Path,
    organization_id: &str,
    file: &Path,
    options: &BatchOptions,
    json: bool,
) -> Result<(), CliError> {
    let contents = std::fs::read_to_string(file)
        .map_err(|e| CliError::input(format!("{}: {}", file.display(), e)))?;
    let request: ConfirmRequest = serde_json::from_str(&contents)
        .map_err(|e| CliError::input(format!("{}: {}", file.display(), e)))?;

    let conn = open_catalog(db_path)?;
    let result = shelfwise_import::confirm_import(
        &conn,
        organization_id,
        &source_name(file),
        &request,
        options,
        &LogProgress,
    )
    .map_err(|e| CliError::import(e.to_string()))?;

    if json {
        return print_json(&result);
    }
    print_result(&result);
    Ok(())
}

fn print_result(result: &BatchOperationResult) {
    crate::log_blank();
    log::info!("  Linked:  {:>6}", result.linked);
    log::info!("  Created: {:>6}", result.created);
    log::info!("  Updated: {:>6}", result.updated);

    if result.success {
        log::info!("{}", "All operations succeeded".if_supports_color(Stderr, |t| t.green()));
        return;
    }

    log::warn!(
        "{}",
        format!("{} operations failed", result.errors.len()).if_supports_color(Stderr, |t| t.red()),
    );
    for error in &result.errors {
        log::warn!("  {:?} {}: {}", error.kind, error.key, error.error);
    }
}
