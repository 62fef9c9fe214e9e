//! Book catalog data model types and file loaders.
//!
//! This crate defines the catalog, selection, import, and reader-profile
//! types without any database dependencies. Consumers can use these types
//! directly for serialization or pass them to `shelfwise-db` for persistence.

pub mod load;
pub mod types;
pub mod yaml;

pub use load::{
    LoadError, load_books_csv, load_candidates_csv, load_profile_json, parse_books_csv,
    parse_candidates_csv,
};
pub use types::*;
pub use yaml::{YamlError, load_genres};
