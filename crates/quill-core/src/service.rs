//! Article orchestration: the only entry point other subsystems call.
//!
//! The service wires one storage backend and one search index together,
//! both chosen at construction and injected as trait objects. Every
//! mutation follows the same shape: sanitize, write to storage (appending
//! a version snapshot first where an edit overwrites content), then tell
//! the index on a best-effort basis. Index failures never fail the
//! triggering mutation; they are logged and repaired by the next rebuild.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::article::{Article, Version};
use crate::error::{QuillError, QuillResult};
use crate::index::{QueryOutcome, SearchHit, SearchIndex};
use crate::ledger::VersionLedger;
use crate::links::{self, LinkReport};
use crate::sanitize::sanitize;
use crate::storage::{ArticlePatch, ArticleStore};
use crate::tagcloud::{tag_cloud, TagCloudEntry};

/// Attribution sentinel when no authenticated user is supplied.
pub const ANONYMOUS: &str = "Anonymous";

/// Cap on the recency-ordered scan used when full-text search is
/// unavailable.
const FALLBACK_SCAN_LIMIT: usize = 500;

/// Cap on "all articles" reads backing aggregations and reindexing.
const ALL_ARTICLES_LIMIT: usize = 10_000;

/// Result cap for full-text queries.
const SEARCH_LIMIT: usize = 50;

/// Orchestrates articles, versions and the search index.
pub struct ArticleService {
    store: Arc<dyn ArticleStore>,
    index: Arc<dyn SearchIndex>,
}

impl ArticleService {
    pub fn new(store: Arc<dyn ArticleStore>, index: Arc<dyn SearchIndex>) -> Self {
        Self { store, index }
    }

    fn ledger(&self) -> VersionLedger<Arc<dyn ArticleStore>> {
        VersionLedger::new(Arc::clone(&self.store))
    }

    /// Create a new article.
    ///
    /// The title is trimmed and must be non-empty; content is sanitized
    /// before it is stored. The new article starts with an empty version
    /// history.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        tags: Vec<String>,
        created_by: &str,
    ) -> QuillResult<Article> {
        let title = title.trim();
        if title.is_empty() {
            return Err(QuillError::Validation("title must not be empty".to_string()));
        }

        let article = Article::new(title, sanitize(content), tags, created_by);
        self.store.put_article(&article).await?;
        debug!(article_id = %article.id, title, "created article");

        self.index_upsert(&article).await;
        Ok(article)
    }

    /// Update an article, snapshotting its current content first.
    ///
    /// Fails with [`QuillError::NotFound`] when the id is unknown. The
    /// version snapshot is appended strictly before the article row is
    /// overwritten; if the content write then fails, the extra version is
    /// harmless, whereas the reverse order would lose history.
    pub async fn update(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
        tags: Vec<String>,
        edited_by: &str,
    ) -> QuillResult<Article> {
        let title = title.trim();
        if title.is_empty() {
            return Err(QuillError::Validation("title must not be empty".to_string()));
        }
        let Some(current) = self.store.get_article(id).await? else {
            return Err(QuillError::NotFound(id));
        };

        self.ledger().append(id, &current.content, edited_by).await?;

        let patch = ArticlePatch::default()
            .with_title(title)
            .with_content(sanitize(content))
            .with_tags(tags)
            .with_updated_by(edited_by)
            .with_updated_at(Utc::now());
        self.store.update_article(id, patch).await?;

        let Some(updated) = self.store.get_article(id).await? else {
            // Deleted underneath us between the write and the read-back.
            return Err(QuillError::NotFound(id));
        };
        self.index_upsert(&updated).await;
        Ok(updated)
    }

    /// Delete an article and its whole version history. Idempotent:
    /// deleting an unknown id is not an error.
    pub async fn delete(&self, id: Uuid) -> QuillResult<()> {
        self.store.delete_versions_for_article(id).await?;
        self.store.delete_article(id).await?;
        debug!(article_id = %id, "deleted article");

        self.index_remove(id).await;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> QuillResult<Option<Article>> {
        Ok(self.store.get_article(id).await?)
    }

    /// First article with this title, in backend-defined order.
    pub async fn get_by_title(&self, title: &str) -> QuillResult<Option<Article>> {
        Ok(self.store.get_article_by_title(title).await?)
    }

    /// Up to `limit` articles, most recently updated first.
    pub async fn list(&self, limit: usize) -> QuillResult<Vec<Article>> {
        Ok(self.store.list_articles(limit).await?)
    }

    pub async fn list_by_tag(&self, tag: &str) -> QuillResult<Vec<Article>> {
        Ok(self.store.list_articles_by_tag(tag).await?)
    }

    /// Version history of an article, most recent first.
    pub async fn versions(&self, article_id: Uuid) -> QuillResult<Vec<Version>> {
        Ok(self.ledger().list(article_id).await?)
    }

    /// Restore a prior version. `Ok(false)` when the version or article is
    /// gone; nothing to do is a normal outcome, not an error.
    pub async fn restore(&self, article_id: Uuid, version_id: Uuid) -> QuillResult<bool> {
        let restored = self.ledger().restore(article_id, version_id).await?;
        if restored {
            if let Some(article) = self.store.get_article(article_id).await? {
                self.index_upsert(&article).await;
            }
        }
        Ok(restored)
    }

    /// Full-text search, falling back to a bounded case-insensitive
    /// substring scan when the index is unavailable or failing.
    pub async fn search(&self, query: &str) -> QuillResult<Vec<SearchHit>> {
        match self.index.query(query, SEARCH_LIMIT).await {
            Ok(QueryOutcome::Hits(hits)) => return Ok(hits),
            Ok(QueryOutcome::Unavailable) => {
                debug!("no search engine configured; using substring fallback");
            }
            Err(err) => {
                warn!(error = %err, "search index query failed; using substring fallback");
            }
        }

        let needle = query.to_lowercase();
        let articles = self.store.list_articles(FALLBACK_SCAN_LIMIT).await?;
        Ok(articles
            .iter()
            .filter(|a| {
                a.title.to_lowercase().contains(&needle)
                    || a.content.to_lowercase().contains(&needle)
                    || a.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .map(SearchHit::from)
            .collect())
    }

    /// Re-index every article. The explicit repair path for index drift;
    /// unlike the per-mutation index writes this one surfaces errors.
    pub async fn rebuild_index(&self) -> QuillResult<usize> {
        let articles = self.store.list_articles(ALL_ARTICLES_LIMIT).await?;
        self.index.rebuild_all(&articles).await?;
        debug!(count = articles.len(), "rebuilt search index");
        Ok(articles.len())
    }

    /// Tag frequencies with deterministic colors and size buckets, count
    /// descending.
    pub async fn tag_cloud(&self) -> QuillResult<Vec<TagCloudEntry>> {
        let articles = self.store.list_articles(ALL_ARTICLES_LIMIT).await?;
        Ok(tag_cloud(&articles))
    }

    /// All distinct tags, sorted.
    pub async fn list_tags(&self) -> QuillResult<Vec<String>> {
        let articles = self.store.list_articles(ALL_ARTICLES_LIMIT).await?;
        let tags: BTreeSet<String> = articles
            .into_iter()
            .flat_map(|a| a.tags)
            .collect();
        Ok(tags.into_iter().collect())
    }

    /// Title suggestions: case-insensitive substring match over the most
    /// recent articles.
    pub async fn autocomplete_titles(&self, query: &str, limit: usize) -> QuillResult<Vec<String>> {
        let needle = query.to_lowercase();
        let articles = self.store.list_articles(100).await?;
        Ok(articles
            .iter()
            .filter(|a| a.title.to_lowercase().contains(&needle))
            .take(limit)
            .map(|a| a.title.clone())
            .collect())
    }

    /// Classify the `[[Title]]` occurrences in `content` as valid or
    /// missing. Valid keeps every occurrence; missing is deduplicated.
    pub async fn validate_links(&self, content: &str) -> QuillResult<LinkReport> {
        let titles = links::extract(content);
        let total = titles.len();

        let mut valid = Vec::new();
        let mut missing: Vec<String> = Vec::new();
        for title in titles {
            if self.store.get_article_by_title(&title).await?.is_some() {
                valid.push(title);
            } else if !missing.contains(&title) {
                missing.push(title);
            }
        }
        Ok(LinkReport { valid, missing, total })
    }

    async fn index_upsert(&self, article: &Article) {
        if let Err(err) = self.index.upsert(article).await {
            warn!(
                article_id = %article.id,
                error = %err,
                "search index upsert failed; index is stale until the next rebuild"
            );
        }
    }

    async fn index_remove(&self, article_id: Uuid) {
        if let Err(err) = self.index.remove(article_id).await {
            warn!(
                %article_id,
                error = %err,
                "search index remove failed; index is stale until the next rebuild"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexError, IndexResult, NullIndex};
    use crate::storage::MemoryArticleStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Index double that fails every write and query.
    struct FailingIndex;

    #[async_trait]
    impl SearchIndex for FailingIndex {
        async fn upsert(&self, _article: &Article) -> IndexResult<()> {
            Err(IndexError::Engine("writer poisoned".to_string()))
        }

        async fn remove(&self, _article_id: Uuid) -> IndexResult<()> {
            Err(IndexError::Engine("writer poisoned".to_string()))
        }

        async fn rebuild_all(&self, _articles: &[Article]) -> IndexResult<()> {
            Err(IndexError::Engine("writer poisoned".to_string()))
        }

        async fn query(&self, _text: &str, _limit: usize) -> IndexResult<QueryOutcome> {
            Err(IndexError::Engine("searcher poisoned".to_string()))
        }
    }

    /// Index double that records upserted/removed ids and answers queries
    /// with a fixed outcome.
    struct RecordingIndex {
        upserts: Mutex<Vec<Uuid>>,
        removes: Mutex<Vec<Uuid>>,
        outcome: QueryOutcome,
    }

    impl RecordingIndex {
        fn with_outcome(outcome: QueryOutcome) -> Self {
            Self {
                upserts: Mutex::new(Vec::new()),
                removes: Mutex::new(Vec::new()),
                outcome,
            }
        }
    }

    #[async_trait]
    impl SearchIndex for RecordingIndex {
        async fn upsert(&self, article: &Article) -> IndexResult<()> {
            self.upserts.lock().push(article.id);
            Ok(())
        }

        async fn remove(&self, article_id: Uuid) -> IndexResult<()> {
            self.removes.lock().push(article_id);
            Ok(())
        }

        async fn rebuild_all(&self, _articles: &[Article]) -> IndexResult<()> {
            Ok(())
        }

        async fn query(&self, _text: &str, _limit: usize) -> IndexResult<QueryOutcome> {
            Ok(self.outcome.clone())
        }
    }

    fn service() -> ArticleService {
        ArticleService::new(Arc::new(MemoryArticleStore::new()), Arc::new(NullIndex))
    }

    fn service_with_index(index: Arc<dyn SearchIndex>) -> ArticleService {
        ArticleService::new(Arc::new(MemoryArticleStore::new()), index)
    }

    #[tokio::test]
    async fn test_create_returns_article_with_no_versions() {
        let svc = service();
        let article = svc
            .create("Welcome", "See [[Getting Started]]", vec!["intro".to_string()], "alice")
            .await
            .expect("create");

        assert_eq!(article.tags, vec!["intro".to_string()]);
        assert!(svc.versions(article.id).await.expect("versions").is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let svc = service();
        let err = svc.create("   ", "content", vec![], "alice").await.unwrap_err();
        assert!(matches!(err, QuillError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_trims_title() {
        let svc = service();
        let article = svc.create("  Padded  ", "", vec![], "a").await.expect("create");
        assert_eq!(article.title, "Padded");
    }

    #[tokio::test]
    async fn test_update_appends_pre_edit_snapshot() {
        let svc = service();
        let article = svc
            .create("Welcome", "See [[Getting Started]]", vec![], "alice")
            .await
            .expect("create");

        svc.update(article.id, "Welcome", "Updated", vec![], "bob")
            .await
            .expect("update");

        let versions = svc.versions(article.id).await.expect("versions");
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version_no, 1);
        assert_eq!(versions[0].content, "See [[Getting Started]]");
        assert_eq!(versions[0].edited_by, "bob");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let svc = service();
        let err = svc
            .update(Uuid::new_v4(), "T", "c", vec![], "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, QuillError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_version_numbers_have_no_gaps() {
        let svc = service();
        let article = svc.create("T", "v0", vec![], "a").await.expect("create");
        for i in 1..=4 {
            svc.update(article.id, "T", &format!("v{i}"), vec![], "a")
                .await
                .expect("update");
        }

        let mut numbers: Vec<u32> = svc
            .versions(article.id)
            .await
            .expect("versions")
            .iter()
            .map(|v| v.version_no)
            .collect();
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_delete_cascades_versions_and_is_idempotent() {
        let svc = service();
        let article = svc.create("T", "v0", vec![], "a").await.expect("create");
        svc.update(article.id, "T", "v1", vec![], "a").await.expect("update");

        svc.delete(article.id).await.expect("delete");
        assert_eq!(svc.get(article.id).await.expect("get"), None);
        assert!(svc.versions(article.id).await.expect("versions").is_empty());

        svc.delete(article.id).await.expect("second delete");
    }

    #[tokio::test]
    async fn test_restore_round_trip_through_service() {
        let svc = service();
        let article = svc.create("T", "A", vec![], "a").await.expect("create");
        svc.update(article.id, "T", "B", vec![], "a").await.expect("update");

        let versions = svc.versions(article.id).await.expect("versions");
        let snapshot = &versions[0];
        assert_eq!(snapshot.content, "A");

        let restored = svc.restore(article.id, snapshot.id).await.expect("restore");
        assert!(restored);
        let current = svc.get(article.id).await.expect("get").expect("some");
        assert_eq!(current.content, "A");
    }

    #[tokio::test]
    async fn test_mutations_survive_failing_index() {
        let svc = service_with_index(Arc::new(FailingIndex));

        let article = svc.create("T", "c", vec![], "a").await.expect("create");
        svc.update(article.id, "T", "c2", vec![], "a").await.expect("update");
        svc.delete(article.id).await.expect("delete");
    }

    #[tokio::test]
    async fn test_mutations_reach_the_index() {
        let index = Arc::new(RecordingIndex::with_outcome(QueryOutcome::Hits(Vec::new())));
        let svc = service_with_index(Arc::clone(&index) as Arc<dyn SearchIndex>);

        let article = svc.create("T", "c", vec![], "a").await.expect("create");
        svc.update(article.id, "T", "c2", vec![], "a").await.expect("update");
        svc.delete(article.id).await.expect("delete");

        assert_eq!(index.upserts.lock().len(), 2);
        assert_eq!(index.removes.lock().as_slice(), &[article.id]);
    }

    #[tokio::test]
    async fn test_search_uses_engine_hits_verbatim() {
        let hit = SearchHit {
            id: Uuid::new_v4(),
            title: "indexed".to_string(),
            content: "".to_string(),
            tags: vec![],
        };
        let index = Arc::new(RecordingIndex::with_outcome(QueryOutcome::Hits(vec![hit.clone()])));
        let svc = service_with_index(index);

        let hits = svc.search("whatever").await.expect("search");
        assert_eq!(hits, vec![hit]);
    }

    #[tokio::test]
    async fn test_search_engine_empty_is_empty_not_fallback() {
        let index = Arc::new(RecordingIndex::with_outcome(QueryOutcome::Hits(Vec::new())));
        let svc = service_with_index(index);
        svc.create("findme", "text", vec![], "a").await.expect("create");

        // The engine ran and found nothing; the substring fallback would
        // have matched, so an empty result proves no fallback happened.
        let hits = svc.search("findme").await.expect("search");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_falls_back_when_unavailable() {
        let svc = service();
        svc.create("Rust Notes", "Learning about ownership", vec!["rust".to_string()], "a")
            .await
            .expect("create");
        svc.create("Cooking", "Pasta recipes", vec![], "a").await.expect("create");

        let by_title = svc.search("rust").await.expect("search");
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].title, "Rust Notes");

        let by_content = svc.search("OWNERSHIP").await.expect("search");
        assert_eq!(by_content.len(), 1);

        let none = svc.search("quantum").await.expect("search");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_search_falls_back_on_index_error() {
        let store = Arc::new(MemoryArticleStore::new());
        let svc = ArticleService::new(
            Arc::clone(&store) as Arc<dyn ArticleStore>,
            Arc::new(NullIndex),
        );
        svc.create("Rust Notes", "text", vec![], "a").await.expect("create");

        let failing = ArticleService::new(store, Arc::new(FailingIndex));
        let hits = failing.search("rust").await.expect("search");
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn test_tag_cloud_counts() {
        let svc = service();
        svc.create("1", "", vec!["a".to_string()], "x").await.expect("create");
        svc.create("2", "", vec!["a".to_string()], "x").await.expect("create");
        svc.create("3", "", vec!["b".to_string()], "x").await.expect("create");

        let cloud = svc.tag_cloud().await.expect("cloud");
        assert_eq!(cloud[0].tag, "a");
        assert_eq!(cloud[0].count, 2);
        assert_eq!(cloud[1].tag, "b");
        assert_eq!(cloud[1].count, 1);
    }

    #[tokio::test]
    async fn test_list_tags_sorted_distinct() {
        let svc = service();
        svc.create("1", "", vec!["beta".to_string(), "alpha".to_string()], "x")
            .await
            .expect("create");
        svc.create("2", "", vec!["alpha".to_string()], "x").await.expect("create");

        let tags = svc.list_tags().await.expect("tags");
        assert_eq!(tags, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[tokio::test]
    async fn test_autocomplete_titles() {
        let svc = service();
        svc.create("Getting Started", "", vec![], "x").await.expect("create");
        svc.create("Advanced Topics", "", vec![], "x").await.expect("create");

        let suggestions = svc.autocomplete_titles("start", 10).await.expect("autocomplete");
        assert_eq!(suggestions, vec!["Getting Started".to_string()]);
    }

    #[tokio::test]
    async fn test_validate_links_classifies_and_dedups() {
        let svc = service();
        svc.create("Known", "", vec![], "x").await.expect("create");

        let report = svc
            .validate_links("[[Known]] then [[Ghost]] and [[Ghost]] again, plus [[Known]]")
            .await
            .expect("validate");

        assert_eq!(report.valid, vec!["Known".to_string(), "Known".to_string()]);
        assert_eq!(report.missing, vec!["Ghost".to_string()]);
        assert_eq!(report.total, 4);
        assert!(report.has_missing());
    }

    #[tokio::test]
    async fn test_get_by_title_first_match() {
        let svc = service();
        svc.create("Dup", "first", vec![], "x").await.expect("create");
        svc.create("Dup", "second", vec![], "x").await.expect("create");

        let found = svc.get_by_title("Dup").await.expect("get").expect("some");
        assert_eq!(found.title, "Dup");
    }
}
