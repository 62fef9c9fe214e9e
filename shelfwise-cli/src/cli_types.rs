//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shelfwise")]
#[command(about = "Reconcile book imports and recommend books from a shared catalog", long_about = None)]
pub(crate) struct Cli {
    /// Catalog database path (defaults to the settings file, then the data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Organization selection shared by commands that act on one library.
#[derive(Args, Clone)]
pub(crate) struct OrgArgs {
    /// Organization id (defaults to catalog.organization_id in settings)
    #[arg(long)]
    pub org: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create or migrate the catalog database
    Init {
        /// Genre dictionary (YAML list of id/name) to load
        #[arg(long)]
        genres: Option<PathBuf>,
    },

    /// Classify a CSV of books against the catalog without writing anything
    Preview {
        /// CSV with a title column and optional author, reading_level columns
        file: PathBuf,

        #[command(flatten)]
        org: OrgArgs,

        /// Override the fuzzy title/author threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Write a confirm file accepting every match, conflict (keeping the
        /// catalog level), and new book; possible matches are left out
        #[arg(long)]
        write_decisions: Option<PathBuf>,

        /// Print the full preview as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply confirmed import decisions from a JSON file
    Confirm {
        /// JSON with matched, newBooks, and conflicts lists
        file: PathBuf,

        #[command(flatten)]
        org: OrgArgs,

        /// Override the number of writes per transaction
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add books from a CSV directly, skipping duplicates
    BulkAdd {
        /// CSV with title, author, reading_level, age_range, genre_ids, description
        file: PathBuf,

        #[command(flatten)]
        org: OrgArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recommend books for a reader profile
    Recommend {
        /// Reader profile JSON
        profile: PathBuf,

        #[command(flatten)]
        org: OrgArgs,

        /// Maximum number of books to recommend
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest authors for a title by comparing it to catalog titles
    SuggestAuthor {
        /// Title to look up
        title: String,

        /// Maximum number of suggestions
        #[arg(short, long, default_value_t = 5)]
        limit: usize,

        /// Print suggestions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a linked book as unavailable to an organization
    Unlink {
        /// Catalog book id
        book_id: String,

        #[command(flatten)]
        org: OrgArgs,
    },

    /// Show catalog statistics
    Stats {
        /// Limit selection and import counts to one organization
        #[arg(long)]
        org: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show effective settings
    Show,

    /// Print the settings file path
    Path,

    /// Set a value (catalog.db_path, catalog.organization_id,
    /// matching.fuzzy_threshold, batch.chunk_size)
    Set {
        key: String,
        value: String,
    },
}
