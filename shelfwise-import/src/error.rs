use shelfwise_db::OperationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The request was rejected before touching the catalog.
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl ImportError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
