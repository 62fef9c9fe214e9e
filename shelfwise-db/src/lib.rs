//! SQLite persistence layer for the book catalog.
//!
//! Provides schema creation, CRUD operations, chunked batch execution,
//! and query APIs backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    OperationError, WriteOp, execute_chunk, insert_book, insert_import_log, insert_selection,
    seed_genres, set_availability, update_book, update_reading_level, upsert_genre,
    upsert_selection,
};
pub use queries::{
    CatalogStats, all_books, available_selections, catalog_stats, genre_names, get_book,
    list_genres, list_import_logs, organization_books, organization_selections,
};
pub use rusqlite::Connection;
pub use schema::{SchemaError, open_database, open_memory};
