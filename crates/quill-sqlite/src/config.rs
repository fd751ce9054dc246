//! SQLite backend configuration.

use std::path::PathBuf;

/// Connection settings for the SQLite store.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file path, or `:memory:` for an in-memory database.
    pub path: PathBuf,
    /// Enable WAL journaling for concurrent readers.
    pub wal_mode: bool,
    /// How long a locked database is retried before failing.
    pub busy_timeout_ms: u32,
}

impl SqliteConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            wal_mode: true,
            busy_timeout_ms: 5_000,
        }
    }

    /// In-memory database for tests.
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            // WAL is meaningless for in-memory databases.
            wal_mode: false,
            busy_timeout_ms: 5_000,
        }
    }
}
