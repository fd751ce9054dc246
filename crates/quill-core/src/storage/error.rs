//! Storage error types.

use thiserror::Error;

/// Error type for storage backend operations.
///
/// Absence is not an error: reads on unknown ids return `Ok(None)` and
/// mutations with nothing to do return `Ok(())` or `Ok(false)`. These
/// variants cover the cases where the backend itself failed. None of them
/// are retried internally; the caller decides whether to surface or retry.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// The document store could not be reached or opened.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// A read or write against durable storage failed (disk I/O, SQL).
    #[error("persistence error: {0}")]
    Persistence(String),

    /// A record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    pub fn unavailable<S: Into<String>>(msg: S) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Whether the backend as a whole is down, as opposed to a single
    /// operation having failed.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable(_))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
