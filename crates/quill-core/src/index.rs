//! Search index abstraction.
//!
//! The index is a derived projection over articles, never a source of
//! truth: it may transiently lag behind storage and is always rebuildable
//! from the article collection. Writes to it are fire-and-forget relative
//! to the storage mutation that triggered them: the service catches and
//! logs failures instead of propagating them.
//!
//! [`QueryOutcome::Unavailable`] ("no engine configured, fall back to a
//! substring scan") and `QueryOutcome::Hits(vec![])` ("the engine ran and
//! found nothing") are semantically distinct and must not be conflated.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::article::Article;

/// Error type for index operations.
///
/// Never surfaces as a failure of the storage mutation that triggered the
/// index write; the caller logs it and moves on.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index engine error: {0}")]
    Engine(String),

    #[error("index I/O error: {0}")]
    Io(String),
}

pub type IndexResult<T> = Result<T, IndexError>;

impl From<std::io::Error> for IndexError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// A matching document returned from a query.
///
/// Carries the stored index fields only; tags are flattened to a
/// comma-joined string inside the index and reconstructed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl From<&Article> for SearchHit {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            content: article.content.clone(),
            tags: article.tags.clone(),
        }
    }
}

/// Result of a query against the index.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// No full-text engine is configured; callers fall back to a
    /// substring scan.
    Unavailable,
    /// The engine ran; the vector may be empty.
    Hits(Vec<SearchHit>),
}

impl QueryOutcome {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, QueryOutcome::Unavailable)
    }
}

/// A full-text index over article title, content and tags.
///
/// The handle is process-wide, opened once at startup. Implementations
/// must support concurrent readers and sequential writers with
/// last-writer-wins per document id.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert or replace the document for an article.
    async fn upsert(&self, article: &Article) -> IndexResult<()>;

    /// Delete the document for an article id. Idempotent.
    async fn remove(&self, article_id: Uuid) -> IndexResult<()>;

    /// Re-index every given article, keyed by id.
    ///
    /// The repair mechanism for drift between storage and index. Only
    /// overwrites documents keyed by id, so it is idempotent and safe to
    /// run concurrently with ongoing traffic.
    async fn rebuild_all(&self, articles: &[Article]) -> IndexResult<()>;

    /// Query across title, content and tags with OR semantics per term.
    async fn query(&self, text: &str, limit: usize) -> IndexResult<QueryOutcome>;
}

#[async_trait]
impl<T: SearchIndex + ?Sized> SearchIndex for std::sync::Arc<T> {
    async fn upsert(&self, article: &Article) -> IndexResult<()> {
        (**self).upsert(article).await
    }

    async fn remove(&self, article_id: Uuid) -> IndexResult<()> {
        (**self).remove(article_id).await
    }

    async fn rebuild_all(&self, articles: &[Article]) -> IndexResult<()> {
        (**self).rebuild_all(articles).await
    }

    async fn query(&self, text: &str, limit: usize) -> IndexResult<QueryOutcome> {
        (**self).query(text, limit).await
    }
}

/// The "no engine configured" index: writes succeed as no-ops and every
/// query answers [`QueryOutcome::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NullIndex;

#[async_trait]
impl SearchIndex for NullIndex {
    async fn upsert(&self, _article: &Article) -> IndexResult<()> {
        Ok(())
    }

    async fn remove(&self, _article_id: Uuid) -> IndexResult<()> {
        Ok(())
    }

    async fn rebuild_all(&self, _articles: &[Article]) -> IndexResult<()> {
        Ok(())
    }

    async fn query(&self, _text: &str, _limit: usize) -> IndexResult<QueryOutcome> {
        Ok(QueryOutcome::Unavailable)
    }
}
