//! The storage backend abstraction for articles and versions.
//!
//! [`ArticleStore`] is the single capability set both persistence variants
//! implement: the SQLite-backed document store (`quill-sqlite`) and the
//! JSON-file store (`quill-jsonstore`). The backend is selected once at
//! service construction and passed around as `Arc<dyn ArticleStore>`;
//! nothing in the system switches backends at runtime.
//!
//! Implementations must produce identical observable results for identical
//! call sequences. The contract suite in `quill-storage-tests` runs the same
//! scenarios against every backend to hold them to that.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::article::{Article, Version};
use crate::storage::StorageResult;

/// A partial update to an article. Unset fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ArticlePatch {
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    #[must_use]
    pub fn with_updated_by(mut self, updated_by: impl Into<String>) -> Self {
        self.updated_by = Some(updated_by.into());
        self
    }

    #[must_use]
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Apply the set fields onto an article in place.
    pub fn apply(&self, article: &mut Article) {
        if let Some(title) = &self.title {
            article.title = title.clone();
        }
        if let Some(content) = &self.content {
            article.content = content.clone();
        }
        if let Some(tags) = &self.tags {
            article.tags = tags.clone();
        }
        if let Some(updated_by) = &self.updated_by {
            article.updated_by = updated_by.clone();
        }
        if let Some(updated_at) = self.updated_at {
            article.updated_at = updated_at;
        }
    }
}

/// Durable key/value persistence for articles and versions.
///
/// # Semantics
///
/// - Reads on unknown ids return `Ok(None)`, never an error.
/// - `delete_article` and `delete_versions_for_article` are idempotent.
/// - `update_article` on an unknown id is a no-op; callers that need to
///   distinguish check existence first.
/// - `list_articles` orders by `updated_at` descending; `list_versions`
///   orders by `version_no` descending; `list_articles_by_tag` is
///   unordered.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`. They provide whatever internal
/// locking they need but no cross-call transaction: the read-modify-write
/// window between `get_article` and `update_article` is the caller's
/// documented race to keep or avoid.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn put_article(&self, article: &Article) -> StorageResult<()>;

    async fn get_article(&self, id: Uuid) -> StorageResult<Option<Article>>;

    /// First article with the given title, in backend-defined order.
    async fn get_article_by_title(&self, title: &str) -> StorageResult<Option<Article>>;

    async fn update_article(&self, id: Uuid, patch: ArticlePatch) -> StorageResult<()>;

    async fn delete_article(&self, id: Uuid) -> StorageResult<()>;

    /// Up to `limit` articles, most recently updated first.
    async fn list_articles(&self, limit: usize) -> StorageResult<Vec<Article>>;

    async fn list_articles_by_tag(&self, tag: &str) -> StorageResult<Vec<Article>>;

    async fn put_version(&self, version: &Version) -> StorageResult<()>;

    async fn get_version(&self, id: Uuid) -> StorageResult<Option<Version>>;

    /// All versions of an article, highest `version_no` first.
    async fn list_versions(&self, article_id: Uuid) -> StorageResult<Vec<Version>>;

    async fn delete_versions_for_article(&self, article_id: Uuid) -> StorageResult<()>;
}

#[async_trait]
impl<T: ArticleStore + ?Sized> ArticleStore for std::sync::Arc<T> {
    async fn put_article(&self, article: &Article) -> StorageResult<()> {
        (**self).put_article(article).await
    }

    async fn get_article(&self, id: Uuid) -> StorageResult<Option<Article>> {
        (**self).get_article(id).await
    }

    async fn get_article_by_title(&self, title: &str) -> StorageResult<Option<Article>> {
        (**self).get_article_by_title(title).await
    }

    async fn update_article(&self, id: Uuid, patch: ArticlePatch) -> StorageResult<()> {
        (**self).update_article(id, patch).await
    }

    async fn delete_article(&self, id: Uuid) -> StorageResult<()> {
        (**self).delete_article(id).await
    }

    async fn list_articles(&self, limit: usize) -> StorageResult<Vec<Article>> {
        (**self).list_articles(limit).await
    }

    async fn list_articles_by_tag(&self, tag: &str) -> StorageResult<Vec<Article>> {
        (**self).list_articles_by_tag(tag).await
    }

    async fn put_version(&self, version: &Version) -> StorageResult<()> {
        (**self).put_version(version).await
    }

    async fn get_version(&self, id: Uuid) -> StorageResult<Option<Version>> {
        (**self).get_version(id).await
    }

    async fn list_versions(&self, article_id: Uuid) -> StorageResult<Vec<Version>> {
        (**self).list_versions(article_id).await
    }

    async fn delete_versions_for_article(&self, article_id: Uuid) -> StorageResult<()> {
        (**self).delete_versions_for_article(article_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut article = Article::new("Old", "body", vec!["a".to_string()], "alice");
        let created_at = article.created_at;

        let patch = ArticlePatch::default()
            .with_title("New")
            .with_updated_by("bob");
        patch.apply(&mut article);

        assert_eq!(article.title, "New");
        assert_eq!(article.updated_by, "bob");
        assert_eq!(article.content, "body");
        assert_eq!(article.tags, vec!["a".to_string()]);
        assert_eq!(article.created_at, created_at);
    }

    #[test]
    fn test_default_patch_is_noop() {
        let mut article = Article::new("Title", "body", vec![], "alice");
        let before = article.clone();
        ArticlePatch::default().apply(&mut article);
        assert_eq!(article, before);
    }
}
