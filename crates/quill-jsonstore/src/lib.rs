//! JSON file storage backend for Quill.
//!
//! The file-store variant of [`quill_core::ArticleStore`]: one JSON
//! document per collection, rewritten atomically in full on every
//! mutation. Zero external services, single-process only.
//!
//! Disk failures surface as [`quill_core::StorageError::Persistence`];
//! codec failures as `Serialization`.

pub mod store;

pub use store::JsonFileStore;
