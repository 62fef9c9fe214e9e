use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use crate::CliError;
use crate::settings::{Settings, default_db_path, settings_path};

/// Show effective settings and where the file lives.
pub(crate) fn run_config_show(settings: &Settings) -> Result<(), CliError> {
    let path = settings_path();
    log::info!(
        "{}",
        "Shelfwise Configuration".if_supports_color(Stderr, |t| t.bold()),
    );
    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stderr, |t| t.cyan()),
            "(exists)".if_supports_color(Stderr, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stderr, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stderr, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    let db = settings.resolve_db_path(None);
    let db_source = if settings.catalog.db_path.is_some() {
        "(settings)"
    } else {
        "(default)"
    };
    log::info!("  catalog.db_path          {} {}", db.display(), db_source.if_supports_color(Stderr, |t| t.dimmed()));
    match &settings.catalog.organization_id {
        Some(org) => log::info!("  catalog.organization_id  {}", org),
        None => log::info!(
            "  catalog.organization_id  {}",
            "(not set)".if_supports_color(Stderr, |t| t.dimmed()),
        ),
    }
    log::info!("  matching.fuzzy_threshold {}", settings.matching.fuzzy_threshold);
    log::info!("  batch.chunk_size         {}", settings.batch.chunk_size);
    if settings.catalog.db_path.is_some() {
        log::debug!("  default database would be {}", default_db_path().display());
    }
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    println!("{}", settings_path().display());
}

/// Update one setting and save the file.
pub(crate) fn run_config_set(mut settings: Settings, key: &str, value: &str) -> Result<(), CliError> {
    settings.set(key, value)?;
    settings.save()?;
    log::info!("Set {} in {}", key, settings_path().display());
    Ok(())
}
