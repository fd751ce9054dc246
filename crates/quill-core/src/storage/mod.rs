//! Storage abstraction for articles and versions.
//!
//! The trait lives here; the durable implementations live in their own
//! crates (`quill-sqlite`, `quill-jsonstore`) and depend on this one.

pub mod article_store;
pub mod error;
pub mod memory;

pub use article_store::{ArticlePatch, ArticleStore};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryArticleStore;
