//! Tantivy full-text search for Quill.
//!
//! Implements [`quill_core::SearchIndex`] over a tantivy index storing one
//! document per article (id, title, content, comma-joined tags). The index
//! is a derived projection: it may lag behind the article store and is
//! rebuilt from it with `rebuild_all`.
//!
//! Deployments that do not configure an index directory use
//! [`quill_core::NullIndex`] instead and get substring-fallback search.

pub mod index;
pub mod schema;

pub use index::TantivyIndex;
pub use schema::ArticleFields;
