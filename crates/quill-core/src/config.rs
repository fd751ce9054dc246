//! Configuration for an embedding application.
//!
//! Three knobs: where data lives, which backend owns it, and whether a
//! full-text index directory is configured. `index_dir = None` means no
//! engine, which wires the service to [`crate::index::NullIndex`] and
//! substring-fallback search. The backend is chosen once at startup and
//! never re-initialized at runtime.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Parse(String),
}

/// Which storage backend owns the articles and versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// SQLite-backed document store.
    Sqlite,
    /// One JSON document per collection, rewritten in full on each write.
    JsonFile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    pub data_dir: PathBuf,
    pub index_dir: Option<PathBuf>,
    pub backend: BackendKind,
}

impl Default for QuillConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_dir: None,
            backend: BackendKind::Sqlite,
        }
    }
}

impl QuillConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Database file location for the SQLite backend.
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("quill.db")
    }
}
