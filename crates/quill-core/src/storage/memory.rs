//! In-memory reference implementation of [`ArticleStore`].
//!
//! Used by service unit tests and the cross-backend contract suite. It is
//! the simplest possible implementation of the trait semantics and the one
//! the durable backends are compared against.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::article::{Article, Version};
use crate::storage::{ArticlePatch, ArticleStore, StorageResult};

#[derive(Default)]
struct MemoryState {
    articles: HashMap<Uuid, Article>,
    versions: HashMap<Uuid, Version>,
}

/// HashMap-backed store with no durability.
#[derive(Default)]
pub struct MemoryArticleStore {
    state: RwLock<MemoryState>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn put_article(&self, article: &Article) -> StorageResult<()> {
        self.state.write().articles.insert(article.id, article.clone());
        Ok(())
    }

    async fn get_article(&self, id: Uuid) -> StorageResult<Option<Article>> {
        Ok(self.state.read().articles.get(&id).cloned())
    }

    async fn get_article_by_title(&self, title: &str) -> StorageResult<Option<Article>> {
        Ok(self
            .state
            .read()
            .articles
            .values()
            .find(|a| a.title == title)
            .cloned())
    }

    async fn update_article(&self, id: Uuid, patch: ArticlePatch) -> StorageResult<()> {
        if let Some(article) = self.state.write().articles.get_mut(&id) {
            patch.apply(article);
        }
        Ok(())
    }

    async fn delete_article(&self, id: Uuid) -> StorageResult<()> {
        self.state.write().articles.remove(&id);
        Ok(())
    }

    async fn list_articles(&self, limit: usize) -> StorageResult<Vec<Article>> {
        let mut articles: Vec<Article> = self.state.read().articles.values().cloned().collect();
        articles.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        articles.truncate(limit);
        Ok(articles)
    }

    async fn list_articles_by_tag(&self, tag: &str) -> StorageResult<Vec<Article>> {
        Ok(self
            .state
            .read()
            .articles
            .values()
            .filter(|a| a.tags.iter().any(|t| t == tag))
            .cloned()
            .collect())
    }

    async fn put_version(&self, version: &Version) -> StorageResult<()> {
        self.state.write().versions.insert(version.id, version.clone());
        Ok(())
    }

    async fn get_version(&self, id: Uuid) -> StorageResult<Option<Version>> {
        Ok(self.state.read().versions.get(&id).cloned())
    }

    async fn list_versions(&self, article_id: Uuid) -> StorageResult<Vec<Version>> {
        let mut versions: Vec<Version> = self
            .state
            .read()
            .versions
            .values()
            .filter(|v| v.article_id == article_id)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.version_no.cmp(&a.version_no));
        Ok(versions)
    }

    async fn delete_versions_for_article(&self, article_id: Uuid) -> StorageResult<()> {
        self.state
            .write()
            .versions
            .retain(|_, v| v.article_id != article_id);
        Ok(())
    }
}
