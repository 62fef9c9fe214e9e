use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;
use shelfwise_recommend::{RecommendOptions, RecommendationResult};

use crate::CliError;

use super::{describe, open_catalog, print_json};

pub(crate) fn run_recommend(
    db_path: &Path,
    organization_id: &str,
    profile: &Path,
    options: &RecommendOptions,
    json: bool,
) -> Result<(), CliError> {
    let profile = shelfwise_catalog::load_profile_json(profile)
        .map_err(|e| CliError::input(e.to_string()))?;
    let conn = open_catalog(db_path)?;
    let result = shelfwise_recommend::recommend(&conn, organization_id, &profile, options)
        .map_err(|e| CliError::database(e.to_string()))?;

    if json {
        return print_json(&result);
    }
    print_recommendations(&result);
    Ok(())
}

fn print_recommendations(result: &RecommendationResult) {
    let summary = &result.profile_summary;
    let reader = summary.student_name.as_deref().unwrap_or(&summary.student_id);
    log::info!(
        "{}",
        format!("Recommendations for {reader}").if_supports_color(Stderr, |t| t.bold()),
    );
    if !summary.favorite_genres.is_empty() {
        log::info!("  Favorite genres: {}", summary.favorite_genres.join(", "));
    }
    if !summary.inferred_genres.is_empty() {
        log::info!("  Reading history: {}", summary.inferred_genres.join(", "));
    }
    if let (Some(min), Some(max)) = (summary.reading_level_min, summary.reading_level_max) {
        log::info!("  Reading level:   {min} - {max}");
    }
    crate::log_blank();

    if result.books.is_empty() {
        log::info!("  No books available for this reader.");
        return;
    }
    for (i, rec) in result.books.iter().enumerate() {
        log::info!(
            "  {:>2}. {} {}",
            i + 1,
            describe(&rec.book.title, rec.book.author.as_deref()),
            format!("[{}]", rec.score).if_supports_color(Stderr, |t| t.dimmed()),
        );
        log::info!(
            "      {}",
            rec.match_reason.if_supports_color(Stderr, |t| t.green()),
        );
        if !rec.genres.is_empty() {
            log::info!("      {}", rec.genres.join(", "));
        }
    }
}
