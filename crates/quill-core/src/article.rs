use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single knowledge base article.
///
/// `content` always holds sanitizer output; raw input never reaches storage.
/// `[[Title]]` markers inside the content are plain text as far as storage is
/// concerned and only become links at render time.
///
/// `updated_at` changes on every mutation and is the sole field used for
/// recency ordering. Titles are not unique; lookup by title returns the
/// first match in backend-defined order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Create a new article with a fresh id and both timestamps set to now.
    ///
    /// The caller is responsible for passing sanitized content.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let created_by = created_by.into();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            tags,
            updated_by: created_by.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An immutable snapshot of an article's content, taken just before the edit
/// that created it overwrote the article.
///
/// `version_no` is strictly increasing per article, starting at 1, and is
/// never reused even after deletions. Versions are copies, never live
/// references; they are removed only when their article is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub id: Uuid,
    pub article_id: Uuid,
    pub version_no: u32,
    pub content: String,
    pub edited_by: String,
    pub edited_at: DateTime<Utc>,
}

impl Version {
    pub fn new(
        article_id: Uuid,
        version_no: u32,
        content: impl Into<String>,
        edited_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            article_id,
            version_no,
            content: content.into(),
            edited_by: edited_by.into(),
            edited_at: Utc::now(),
        }
    }
}
