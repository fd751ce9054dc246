//! SQLite storage backend for Quill.
//!
//! The document-store variant of [`quill_core::ArticleStore`]: articles and
//! versions live in two SQLite tables behind a single mutex-guarded
//! connection in WAL mode.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_sqlite::SqliteArticleStore;
//! use quill_core::ArticleStore;
//!
//! let store = SqliteArticleStore::open("./data/quill.db")?;
//! let article = store.get_article(id).await?;
//! ```
//!
//! Open/connect failures surface as
//! [`quill_core::StorageError::BackendUnavailable`]; statement failures as
//! `Persistence`.

pub mod article_store;
pub mod config;
pub mod connection;
pub mod error;
pub mod schema;

pub use article_store::SqliteArticleStore;
pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
