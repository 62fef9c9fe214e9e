//! shelfwise CLI
//!
//! Command-line interface for reconciling book imports against a shared
//! catalog and recommending books to readers.

mod cli_types;
mod commands;
mod error;
mod settings;

use std::io::Write;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;
use settings::Settings;
use shelfwise_recommend::RecommendOptions;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Install the logger. Normal output is bare messages; `--verbose` switches
/// to env_logger's timestamped format at debug level. `RUST_LOG` overrides
/// the level either way.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    if !verbose {
        builder.format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            other => writeln!(buf, "{}: {}", other.as_str().to_lowercase(), record.args()),
        });
    }
    builder.init();
}

/// Print an empty line through the logger.
pub(crate) fn log_blank() {
    log::info!("");
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load()?;
    let db_path = settings.resolve_db_path(cli.db);

    match cli.command {
        Commands::Init { genres } => commands::init::run_init(&db_path, genres),
        Commands::Preview {
            file,
            org,
            threshold,
            write_decisions,
            json,
        } => {
            let org = settings.resolve_org(org.org)?;
            let options = settings.reconcile_options(threshold);
            commands::preview::run_preview(&db_path, &org, &file, &options, write_decisions, json)
        }
        Commands::Confirm {
            file,
            org,
            chunk_size,
            json,
        } => {
            let org = settings.resolve_org(org.org)?;
            let options = settings.batch_options(chunk_size);
            commands::confirm::run_confirm(&db_path, &org, &file, &options, json)
        }
        Commands::BulkAdd { file, org, json } => {
            let org = settings.resolve_org(org.org)?;
            let options = settings.batch_options(None);
            commands::bulk_add::run_bulk_add(&db_path, &org, &file, &options, json)
        }
        Commands::Recommend {
            profile,
            org,
            limit,
            json,
        } => {
            let org = settings.resolve_org(org.org)?;
            let mut options = RecommendOptions::default();
            if let Some(limit) = limit {
                options.limit = limit;
            }
            commands::recommend::run_recommend(&db_path, &org, &profile, &options, json)
        }
        Commands::SuggestAuthor { title, limit, json } => {
            commands::suggest::run_suggest_author(&db_path, &title, limit, json)
        }
        Commands::Unlink { book_id, org } => {
            let org = settings.resolve_org(org.org)?;
            commands::unlink::run_unlink(&db_path, &org, &book_id)
        }
        Commands::Stats { org } => {
            let org = org.or_else(|| settings.catalog.organization_id.clone());
            commands::stats::run_stats(&db_path, org.as_deref())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&settings),
            ConfigAction::Path => {
                commands::config::run_config_path();
                Ok(())
            }
            ConfigAction::Set { key, value } => {
                commands::config::run_config_set(settings, &key, &value)
            }
        },
    }
}
