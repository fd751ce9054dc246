//! Core of the Quill personal knowledge base.
//!
//! Articles with free-text content, tags and a linear version history,
//! persisted through one of two interchangeable storage backends, with a
//! full-text index kept in sync with writes on a best-effort basis.
//!
//! This crate owns the types, the storage and index traits, the version
//! ledger, the content sanitizer, the diff engine and the orchestrating
//! [`ArticleService`]. Backend implementations live in `quill-sqlite` and
//! `quill-jsonstore`; the tantivy index lives in `quill-search`. Consumers
//! pick one of each at startup and inject them:
//!
//! ```ignore
//! use std::sync::Arc;
//! use quill_core::{ArticleService, NullIndex};
//! use quill_sqlite::SqliteArticleStore;
//!
//! let store = Arc::new(SqliteArticleStore::open(&config.sqlite_path())?);
//! let service = ArticleService::new(store, Arc::new(NullIndex));
//! ```

pub mod article;
pub mod config;
pub mod diff;
pub mod error;
pub mod index;
pub mod ledger;
pub mod links;
pub mod sanitize;
pub mod service;
pub mod storage;
pub mod tagcloud;

pub use article::{Article, Version};
pub use config::{BackendKind, QuillConfig};
pub use error::{QuillError, QuillResult};
pub use index::{IndexError, IndexResult, NullIndex, QueryOutcome, SearchHit, SearchIndex};
pub use ledger::VersionLedger;
pub use links::LinkReport;
pub use sanitize::sanitize;
pub use service::{ArticleService, ANONYMOUS};
pub use storage::{ArticlePatch, ArticleStore, MemoryArticleStore, StorageError, StorageResult};
pub use tagcloud::{tag_cloud, TagCloudEntry, TagSize, TAG_PALETTE};
