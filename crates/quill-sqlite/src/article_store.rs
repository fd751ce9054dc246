//! [`ArticleStore`] implementation over SQLite.
//!
//! Articles and versions are two plain tables keyed by id. Tags live in a
//! JSON array column and are matched with `json_each`; timestamps are
//! fixed-width RFC 3339 text so `ORDER BY updated_at` is chronological.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use quill_core::{Article, ArticlePatch, ArticleStore, StorageResult, Version};

use crate::connection::SqlitePool;
use crate::error::{SqliteError, SqliteResult};

const ARTICLE_COLUMNS: &str =
    "id, title, content, tags, created_by, updated_by, created_at, updated_at";
const VERSION_COLUMNS: &str = "id, article_id, version_no, content, edited_by, edited_at";

/// SQLite-backed document store for articles and versions.
#[derive(Clone)]
pub struct SqliteArticleStore {
    pool: SqlitePool,
}

impl SqliteArticleStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) a store at the given database path.
    pub fn open(path: impl Into<std::path::PathBuf>) -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::new(crate::config::SqliteConfig::new(path))?))
    }

    /// In-memory store for tests.
    pub fn memory() -> SqliteResult<Self> {
        Ok(Self::new(SqlitePool::memory()?))
    }
}

fn encode_time(ts: DateTime<Utc>) -> String {
    // Fixed-width fraction keeps lexicographic order chronological.
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_time(text: &str) -> SqliteResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SqliteError::Serialization(format!("bad timestamp {text:?}: {e}")))
}

fn decode_uuid(text: &str) -> SqliteResult<Uuid> {
    Uuid::parse_str(text).map_err(|e| SqliteError::Serialization(format!("bad id {text:?}: {e}")))
}

fn encode_tags(tags: &[String]) -> SqliteResult<String> {
    serde_json::to_string(tags).map_err(|e| SqliteError::Serialization(e.to_string()))
}

fn decode_tags(text: &str) -> SqliteResult<Vec<String>> {
    serde_json::from_str(text)
        .map_err(|e| SqliteError::Serialization(format!("bad tags {text:?}: {e}")))
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String, String, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn decode_article(
    (id, title, content, tags, created_by, updated_by, created_at, updated_at): (
        String,
        String,
        String,
        String,
        String,
        String,
        String,
        String,
    ),
) -> SqliteResult<Article> {
    Ok(Article {
        id: decode_uuid(&id)?,
        title,
        content,
        tags: decode_tags(&tags)?,
        created_by,
        updated_by,
        created_at: decode_time(&created_at)?,
        updated_at: decode_time(&updated_at)?,
    })
}

fn version_from_row(row: &Row<'_>) -> rusqlite::Result<(String, String, u32, String, String, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn decode_version(
    (id, article_id, version_no, content, edited_by, edited_at): (
        String,
        String,
        u32,
        String,
        String,
        String,
    ),
) -> SqliteResult<Version> {
    Ok(Version {
        id: decode_uuid(&id)?,
        article_id: decode_uuid(&article_id)?,
        version_no,
        content,
        edited_by,
        edited_at: decode_time(&edited_at)?,
    })
}

fn write_article(conn: &rusqlite::Connection, article: &Article) -> SqliteResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO articles
             (id, title, content, tags, created_by, updated_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            article.id.to_string(),
            article.title,
            article.content,
            encode_tags(&article.tags)?,
            article.created_by,
            article.updated_by,
            encode_time(article.created_at),
            encode_time(article.updated_at),
        ],
    )
    .map_err(|e| SqliteError::Query(e.to_string()))?;
    Ok(())
}

fn read_article(conn: &rusqlite::Connection, id: Uuid) -> SqliteResult<Option<Article>> {
    let row = conn
        .query_row(
            &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?1"),
            params![id.to_string()],
            article_from_row,
        )
        .optional()
        .map_err(|e| SqliteError::Query(e.to_string()))?;
    row.map(decode_article).transpose()
}

#[async_trait]
impl ArticleStore for SqliteArticleStore {
    async fn put_article(&self, article: &Article) -> StorageResult<()> {
        self.pool.with_connection(|conn| write_article(conn, article))?;
        Ok(())
    }

    async fn get_article(&self, id: Uuid) -> StorageResult<Option<Article>> {
        Ok(self.pool.with_connection(|conn| read_article(conn, id))?)
    }

    async fn get_article_by_title(&self, title: &str) -> StorageResult<Option<Article>> {
        let article = self.pool.with_connection(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE title = ?1 LIMIT 1"),
                    params![title],
                    article_from_row,
                )
                .optional()
                .map_err(|e| SqliteError::Query(e.to_string()))?;
            row.map(decode_article).transpose()
        })?;
        Ok(article)
    }

    async fn update_article(&self, id: Uuid, patch: ArticlePatch) -> StorageResult<()> {
        // Read-modify-write under the single connection lock.
        self.pool.with_connection(|conn| {
            let Some(mut article) = read_article(conn, id)? else {
                return Ok(());
            };
            patch.apply(&mut article);
            write_article(conn, &article)
        })?;
        Ok(())
    }

    async fn delete_article(&self, id: Uuid) -> StorageResult<()> {
        self.pool.with_connection(|conn| {
            conn.execute("DELETE FROM articles WHERE id = ?1", params![id.to_string()])
                .map_err(|e| SqliteError::Query(e.to_string()))?;
            Ok(())
        })?;
        Ok(())
    }

    async fn list_articles(&self, limit: usize) -> StorageResult<Vec<Article>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let articles = self.pool.with_connection(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY updated_at DESC LIMIT ?1"
                ))
                .map_err(|e| SqliteError::Query(e.to_string()))?;
            let rows = stmt
                .query_map(params![limit], article_from_row)
                .map_err(|e| SqliteError::Query(e.to_string()))?;
            rows.map(|row| decode_article(row.map_err(|e| SqliteError::Query(e.to_string()))?))
                .collect::<SqliteResult<Vec<_>>>()
        })?;
        Ok(articles)
    }

    async fn list_articles_by_tag(&self, tag: &str) -> StorageResult<Vec<Article>> {
        let articles = self.pool.with_connection(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {ARTICLE_COLUMNS} FROM articles a
                     WHERE EXISTS (
                         SELECT 1 FROM json_each(a.tags) WHERE json_each.value = ?1
                     )"
                ))
                .map_err(|e| SqliteError::Query(e.to_string()))?;
            let rows = stmt
                .query_map(params![tag], article_from_row)
                .map_err(|e| SqliteError::Query(e.to_string()))?;
            rows.map(|row| decode_article(row.map_err(|e| SqliteError::Query(e.to_string()))?))
                .collect::<SqliteResult<Vec<_>>>()
        })?;
        Ok(articles)
    }

    async fn put_version(&self, version: &Version) -> StorageResult<()> {
        self.pool.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO versions
                     (id, article_id, version_no, content, edited_by, edited_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    version.id.to_string(),
                    version.article_id.to_string(),
                    version.version_no,
                    version.content,
                    version.edited_by,
                    encode_time(version.edited_at),
                ],
            )
            .map_err(|e| SqliteError::Query(e.to_string()))?;
            Ok(())
        })?;
        Ok(())
    }

    async fn get_version(&self, id: Uuid) -> StorageResult<Option<Version>> {
        let version = self.pool.with_connection(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {VERSION_COLUMNS} FROM versions WHERE id = ?1"),
                    params![id.to_string()],
                    version_from_row,
                )
                .optional()
                .map_err(|e| SqliteError::Query(e.to_string()))?;
            row.map(decode_version).transpose()
        })?;
        Ok(version)
    }

    async fn list_versions(&self, article_id: Uuid) -> StorageResult<Vec<Version>> {
        let versions = self.pool.with_connection(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {VERSION_COLUMNS} FROM versions
                     WHERE article_id = ?1 ORDER BY version_no DESC"
                ))
                .map_err(|e| SqliteError::Query(e.to_string()))?;
            let rows = stmt
                .query_map(params![article_id.to_string()], version_from_row)
                .map_err(|e| SqliteError::Query(e.to_string()))?;
            rows.map(|row| decode_version(row.map_err(|e| SqliteError::Query(e.to_string()))?))
                .collect::<SqliteResult<Vec<_>>>()
        })?;
        Ok(versions)
    }

    async fn delete_versions_for_article(&self, article_id: Uuid) -> StorageResult<()> {
        self.pool.with_connection(|conn| {
            conn.execute(
                "DELETE FROM versions WHERE article_id = ?1",
                params![article_id.to_string()],
            )
            .map_err(|e| SqliteError::Query(e.to_string()))?;
            Ok(())
        })?;
        Ok(())
    }
}
