//! Error types for the SQLite backend.

use thiserror::Error;

use quill_core::StorageError;

/// SQLite backend error type.
#[derive(Error, Debug)]
pub enum SqliteError {
    /// Database could not be opened or reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("query error: {0}")]
    Query(String),

    /// Schema/migration error.
    #[error("schema error: {0}")]
    Schema(String),

    /// Row contents could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Underlying rusqlite error.
    #[error("sqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations.
pub type SqliteResult<T> = Result<T, SqliteError>;

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Connection(msg) => Self::BackendUnavailable(msg),
            SqliteError::Query(msg) => Self::Persistence(msg),
            SqliteError::Schema(msg) => Self::Persistence(msg),
            SqliteError::Serialization(msg) => Self::Serialization(msg),
            SqliteError::Rusqlite(e) => Self::Persistence(e.to_string()),
        }
    }
}
