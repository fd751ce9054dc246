//! [`ArticleStore`] implementation over plain JSON files.
//!
//! One JSON document per collection (`articles.json` and `versions.json`),
//! each mapping id to record. The whole collection is loaded once at open
//! and rewritten in full on every mutation (temp file + rename, so a
//! crashed write never leaves a torn document).
//!
//! Bounded to single-process use: two processes mutating the same data
//! directory will overwrite each other's writes. Multi-writer deployments
//! use the document store instead.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::warn;
use uuid::Uuid;

use quill_core::{Article, ArticlePatch, ArticleStore, StorageError, StorageResult, Version};

const ARTICLES_FILE: &str = "articles.json";
const VERSIONS_FILE: &str = "versions.json";

#[derive(Default)]
struct JsonState {
    articles: HashMap<Uuid, Article>,
    versions: HashMap<Uuid, Version>,
}

/// File-backed store persisting each collection as a single JSON document.
pub struct JsonFileStore {
    data_dir: PathBuf,
    state: RwLock<JsonState>,
}

impl JsonFileStore {
    /// Open a store in `data_dir`, creating the directory if needed and
    /// loading any existing collections.
    ///
    /// An unparseable collection file is logged and treated as empty, the
    /// same way a missing one is; it gets overwritten by the next
    /// mutation.
    pub fn open(data_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        let state = JsonState {
            articles: load_collection(&data_dir.join(ARTICLES_FILE))?,
            versions: load_collection(&data_dir.join(VERSIONS_FILE))?,
        };
        Ok(Self {
            data_dir,
            state: RwLock::new(state),
        })
    }

    fn persist_articles(&self, state: &JsonState) -> StorageResult<()> {
        save_collection(&self.data_dir.join(ARTICLES_FILE), &state.articles)
    }

    fn persist_versions(&self, state: &JsonState) -> StorageResult<()> {
        save_collection(&self.data_dir.join(VERSIONS_FILE), &state.versions)
    }
}

fn load_collection<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> StorageResult<HashMap<Uuid, T>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let text = std::fs::read_to_string(path)?;
    match serde_json::from_str(&text) {
        Ok(map) => Ok(map),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unparseable collection file; starting empty");
            Ok(HashMap::new())
        }
    }
}

/// Rewrite the whole collection document. Writes into a temp file in the
/// same directory, then renames over the target so readers never observe a
/// partial document.
fn save_collection<T: serde::Serialize>(
    path: &Path,
    collection: &HashMap<Uuid, T>,
) -> StorageResult<()> {
    let json = serde_json::to_string_pretty(collection)?;

    let dir = path
        .parent()
        .ok_or_else(|| StorageError::persistence(format!("no parent dir for {}", path.display())))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    tmp.persist(path)
        .map_err(|e| StorageError::persistence(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl ArticleStore for JsonFileStore {
    async fn put_article(&self, article: &Article) -> StorageResult<()> {
        let mut state = self.state.write();
        state.articles.insert(article.id, article.clone());
        self.persist_articles(&state)
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
        let mut state = self.state.write();
        let Some(article) = state.articles.get_mut(&id) else {
            return Ok(());
        };
        patch.apply(article);
        self.persist_articles(&state)
    }

    async fn delete_article(&self, id: Uuid) -> StorageResult<()> {
        let mut state = self.state.write();
        if state.articles.remove(&id).is_some() {
            self.persist_articles(&state)?;
        }
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
        let mut state = self.state.write();
        state.versions.insert(version.id, version.clone());
        self.persist_versions(&state)
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
        let mut state = self.state.write();
        let before = state.versions.len();
        state.versions.retain(|_, v| v.article_id != article_id);
        if state.versions.len() != before {
            self.persist_versions(&state)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &Path) -> JsonFileStore {
        JsonFileStore::open(dir).expect("open store")
    }

    #[tokio::test]
    async fn test_round_trip_and_files_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let article = Article::new("Title", "body", vec!["t".to_string()], "alice");

        store.put_article(&article).await.expect("put");

        assert!(dir.path().join("articles.json").exists());
        let loaded = store.get_article(article.id).await.expect("get").expect("some");
        assert_eq!(loaded, article);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let article = Article::new("Durable", "body", vec![], "x");
        let version = Version::new(article.id, 1, "v1", "x");

        {
            let store = store_in(dir.path());
            store.put_article(&article).await.expect("put article");
            store.put_version(&version).await.expect("put version");
        }

        let store = store_in(dir.path());
        assert_eq!(
            store.get_article(article.id).await.expect("get"),
            Some(article.clone())
        );
        assert_eq!(store.list_versions(article.id).await.expect("list"), vec![version]);
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("articles.json"), "{ not json").expect("write");

        let store = store_in(dir.path());
        assert!(store.list_articles(10).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        store
            .update_article(Uuid::new_v4(), ArticlePatch::default().with_title("x"))
            .await
            .expect("update");
        // Nothing to persist, so no file should have been created.
        assert!(!dir.path().join("articles.json").exists());
    }

    #[tokio::test]
    async fn test_delete_cascade_versions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let article = Article::new("T", "", vec![], "x");
        store.put_article(&article).await.expect("put");
        for no in 1..=2 {
            store
                .put_version(&Version::new(article.id, no, "c", "x"))
                .await
                .expect("put version");
        }
        let other = Version::new(Uuid::new_v4(), 1, "other", "x");
        store.put_version(&other).await.expect("put other");

        store.delete_versions_for_article(article.id).await.expect("delete versions");
        store.delete_article(article.id).await.expect("delete article");

        assert!(store.list_versions(article.id).await.expect("list").is_empty());
        assert_eq!(store.list_versions(other.article_id).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_list_orders_by_recency() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        for title in ["first", "second"] {
            store
                .put_article(&Article::new(title, "", vec![], "x"))
                .await
                .expect("put");
        }

        let titles: Vec<String> = store
            .list_articles(10)
            .await
            .expect("list")
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);
    }
}
