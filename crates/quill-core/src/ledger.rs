//! The version ledger: an append-only history protocol over a storage
//! backend.
//!
//! The ledger owns no storage of its own; it layers sequencing and restore
//! semantics on the version operations of an [`ArticleStore`].
//!
//! Ordering is load-bearing: a snapshot must be appended with the
//! article's *pre-edit* content, before the article row is overwritten.
//! Sequencing relies on reading existing versions rather than locking, so
//! appending after the overwrite would capture the wrong content with no
//! way to recover it. An extra version is harmless; a missing one is not.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::article::Version;
use crate::sanitize::sanitize;
use crate::storage::{ArticlePatch, ArticleStore, StorageResult};

/// Attribution recorded on the snapshot a restore takes of the current
/// content before overwriting it.
const SYSTEM_EDITOR: &str = "System";

/// Append-only version history over a storage backend.
pub struct VersionLedger<S> {
    store: S,
}

impl<S: ArticleStore> VersionLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append an immutable snapshot of `content` for the article.
    ///
    /// The next `version_no` is one past the article's current maximum
    /// (1 when no versions exist); numbers are never reused, even after
    /// deletions of other articles.
    pub async fn append(
        &self,
        article_id: Uuid,
        content: &str,
        edited_by: &str,
    ) -> StorageResult<Version> {
        let existing = self.store.list_versions(article_id).await?;
        let next_no = existing.iter().map(|v| v.version_no).max().unwrap_or(0) + 1;

        let version = Version::new(article_id, next_no, sanitize(content), edited_by);
        self.store.put_version(&version).await?;
        debug!(%article_id, version_no = next_no, "appended version snapshot");
        Ok(version)
    }

    /// All versions of the article, most recent first.
    pub async fn list(&self, article_id: Uuid) -> StorageResult<Vec<Version>> {
        self.store.list_versions(article_id).await
    }

    /// Overwrite the article's content with a prior version's content.
    ///
    /// Returns `Ok(false)` with no side effects when the version does not
    /// exist, belongs to a different article, or the article itself is
    /// gone. Otherwise the current content is snapshotted first (restore
    /// is itself undoable) and the article is overwritten with the target
    /// content and a fresh `updated_at`.
    ///
    /// There is no revision token: a concurrent edit between the read and
    /// the final write can be silently overwritten, same as a concurrent
    /// pair of updates.
    pub async fn restore(&self, article_id: Uuid, version_id: Uuid) -> StorageResult<bool> {
        let Some(target) = self.store.get_version(version_id).await? else {
            return Ok(false);
        };
        if target.article_id != article_id {
            return Ok(false);
        }
        let Some(current) = self.store.get_article(article_id).await? else {
            return Ok(false);
        };

        self.append(article_id, &current.content, SYSTEM_EDITOR).await?;

        let patch = ArticlePatch::default()
            .with_content(target.content)
            .with_updated_at(Utc::now());
        self.store.update_article(article_id, patch).await?;
        debug!(%article_id, %version_id, "restored version");
        Ok(true)
    }
}
