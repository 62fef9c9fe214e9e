use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::CliError;

pub(crate) fn run_init(db_path: &Path, genres: Option<PathBuf>) -> Result<(), CliError> {
    let existed = db_path.exists();
    let conn = shelfwise_db::open_database(db_path)
        .map_err(|e| CliError::database(format!("Failed to open catalog database: {}", e)))?;

    log::info!(
        "{} {}",
        if existed { "Opened" } else { "Created" },
        db_path.display().if_supports_color(Stderr, |t| t.cyan()),
    );

    if let Some(path) = genres {
        let genres = shelfwise_catalog::load_genres(&path)
            .map_err(|e| CliError::input(e.to_string()))?;
        let count = shelfwise_db::seed_genres(&conn, &genres)
            .map_err(|e| CliError::database(format!("Failed to load genres: {}", e)))?;
        log::info!("  Loaded {} genres from {}", count, path.display());
    }

    Ok(())
}
