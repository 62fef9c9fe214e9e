use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;
use shelfwise_import::{ImportPreview, MatchCategory, PreviewEntry, ReconcileOptions};

use crate::CliError;

use super::{describe, open_catalog, print_json};

pub(crate) fn run_preview(
    db_path: &Path,
    organization_id: &str,
    file: &Path,
    options: &ReconcileOptions,
    write_decisions: Option<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    if !(options.fuzzy_threshold > 0.0 && options.fuzzy_threshold <= 1.0) {
        return Err(CliError::config(format!(
            "threshold must be in (0, 1], got {}",
            options.fuzzy_threshold
        )));
    }

    let candidates = shelfwise_catalog::load_candidates_csv(file)
        .map_err(|e| CliError::input(e.to_string()))?;
    let conn = open_catalog(db_path)?;
    let preview = shelfwise_import::preview_import(&conn, organization_id, &candidates, options)
        .map_err(|e| CliError::import(e.to_string()))?;

    if let Some(path) = write_decisions {
        let request = shelfwise_import::default_decisions(&preview);
        let contents = serde_json::to_string_pretty(&request).map_err(std::io::Error::other)?;
        std::fs::write(&path, contents)?;
        log::info!("Wrote decisions to {}", path.display());
    }

    if json {
        return print_json(&preview);
    }
    print_preview(&preview);
    Ok(())
}

fn print_preview(preview: &ImportPreview) {
    let s = &preview.summary;
    log::info!(
        "{}",
        format!("Import Preview ({} books)", s.total).if_supports_color(Stderr, |t| t.bold()),
    );
    log::info!("  Matched:            {:>6}", s.matched);
    log::info!("  Possible matches:   {:>6}", s.possible_matches);
    log::info!("  New books:          {:>6}", s.new_books);
    log::info!("  Conflicts:          {:>6}", s.conflicts);
    log::info!("  Already in library: {:>6}", s.already_in_library);
    if s.skipped > 0 {
        log::info!("  Skipped (no title): {:>6}", s.skipped);
    }

    print_section("Possible matches", &preview.possible_matches);
    print_section("Conflicts", &preview.conflicts);
    print_section("New books", &preview.new_books);
}

fn print_section(heading: &str, entries: &[PreviewEntry]) {
    if entries.is_empty() {
        return;
    }
    crate::log_blank();
    log::info!("{}", heading.if_supports_color(Stderr, |t| t.bold()));
    for entry in entries {
        let candidate = describe(&entry.candidate.title, entry.candidate.author.as_deref());
        match (&entry.category, &entry.existing) {
            (MatchCategory::PossibleMatch { title_similarity, .. }, Some(existing)) => {
                log::info!(
                    "  {} -> {} [{}] {:.0}%",
                    candidate,
                    describe(&existing.title, existing.author.as_deref())
                        .if_supports_color(Stderr, |t| t.cyan()),
                    existing.id.if_supports_color(Stderr, |t| t.dimmed()),
                    title_similarity * 100.0,
                );
            }
            (MatchCategory::Conflict { details, .. }, Some(existing)) => {
                log::info!(
                    "  {}: catalog level {}, imported level {} [{}]",
                    candidate,
                    details.existing_reading_level.if_supports_color(Stderr, |t| t.yellow()),
                    details.imported_reading_level.if_supports_color(Stderr, |t| t.yellow()),
                    existing.id.if_supports_color(Stderr, |t| t.dimmed()),
                );
            }
            _ => log::info!("  {}", candidate),
        }
    }
}
