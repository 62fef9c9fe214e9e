use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::CliError;

use super::{open_catalog, print_json};

pub(crate) fn run_suggest_author(
    db_path: &Path,
    title: &str,
    limit: usize,
    json: bool,
) -> Result<(), CliError> {
    let conn = open_catalog(db_path)?;
    let catalog = shelfwise_db::all_books(&conn).map_err(|e| CliError::database(e.to_string()))?;
    let suggestions = shelfwise_import::suggest_authors(title, &catalog, limit);

    if json {
        return print_json(&suggestions);
    }
    if suggestions.is_empty() {
        log::info!("No catalog titles resemble \"{}\"", title);
        return Ok(());
    }
    for s in &suggestions {
        log::info!(
            "  {:<30} {:>4.0}%  {}",
            s.author.if_supports_color(Stderr, |t| t.bold()),
            s.score * 100.0,
            s.matched_title.if_supports_color(Stderr, |t| t.dimmed()),
        );
    }
    Ok(())
}
