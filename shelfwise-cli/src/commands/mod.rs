pub(crate) mod bulk_add;
pub(crate) mod config;
pub(crate) mod confirm;
pub(crate) mod init;
pub(crate) mod preview;
pub(crate) mod recommend;
pub(crate) mod stats;
pub(crate) mod suggest;
pub(crate) mod unlink;

use std::path::Path;

use serde::Serialize;
use shelfwise_db::Connection;

use crate::CliError;

/// Open an existing catalog database.
pub(crate) fn open_catalog(db_path: &Path) -> Result<Connection, CliError> {
    if !db_path.exists() {
        return Err(CliError::database(format!(
            "No catalog database found at {}. Run 'shelfwise init' first.",
            db_path.display()
        )));
    }
    shelfwise_db::open_database(db_path)
        .map_err(|e| CliError::database(format!("Failed to open catalog database: {}", e)))
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    println!("{json}");
    Ok(())
}

/// Display name for a file, used as the import log's source name.
pub(crate) fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Truncate a string to a maximum width, appending "..." if needed.
pub(crate) fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let kept: String = s.chars().take(max - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max).collect()
    }
}

/// `Title` or `Title (Author)`.
pub(crate) fn describe(title: &str, author: Option<&str>) -> String {
    match author.filter(|a| !a.trim().is_empty()) {
        Some(author) => format!("{} ({})", truncate_str(title, 60), author),
        None => truncate_str(title, 60),
    }
}
