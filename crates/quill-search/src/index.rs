//! Tantivy-backed implementation of [`SearchIndex`].
//!
//! The index handle is process-wide and opened once: the reader supports
//! concurrent searches while the single writer sits behind a mutex, giving
//! last-writer-wins per document id. Every write commits and reloads the
//! reader before returning, so a search issued after an upsert sees it.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::{doc, Index, IndexReader, IndexWriter, TantivyDocument, Term};
use tracing::warn;
use uuid::Uuid;

use quill_core::{Article, IndexError, IndexResult, QueryOutcome, SearchHit, SearchIndex};

use crate::schema::ArticleFields;

/// Heap given to the tantivy writer.
const WRITER_BUDGET_BYTES: usize = 50_000_000;

/// Full-text index over article title, content and tags.
pub struct TantivyIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: ArticleFields,
}

fn engine(err: impl std::fmt::Display) -> IndexError {
    IndexError::Engine(err.to_string())
}

impl TantivyIndex {
    /// Open or create an index in the given directory.
    pub fn open_in_dir(dir: impl AsRef<Path>) -> IndexResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let fields = ArticleFields::build();
        let mmap = tantivy::directory::MmapDirectory::open(dir).map_err(engine)?;
        let index = Index::open_or_create(mmap, fields.schema.clone()).map_err(engine)?;
        Self::from_index(index, fields)
    }

    /// RAM-backed index for tests.
    pub fn in_ram() -> IndexResult<Self> {
        let fields = ArticleFields::build();
        let index = Index::create_in_ram(fields.schema.clone());
        Self::from_index(index, fields)
    }

    fn from_index(index: Index, fields: ArticleFields) -> IndexResult<Self> {
        let writer = index.writer(WRITER_BUDGET_BYTES).map_err(engine)?;
        let reader = index.reader().map_err(engine)?;
        Ok(Self {
            index,
            reader,
            writer: Mutex::new(writer),
            fields,
        })
    }

    fn id_term(&self, article_id: Uuid) -> Term {
        Term::from_field_text(self.fields.id, &article_id.to_string())
    }

    fn write_article(&self, writer: &IndexWriter, article: &Article) -> IndexResult<()> {
        writer.delete_term(self.id_term(article.id));
        writer
            .add_document(doc!(
                self.fields.id => article.id.to_string(),
                self.fields.title => article.title.clone(),
                self.fields.content => article.content.clone(),
                self.fields.tags => article.tags.join(", "),
            ))
            .map_err(engine)?;
        Ok(())
    }

    /// Commit pending writes and make them visible to searches.
    fn commit(&self, writer: &mut IndexWriter) -> IndexResult<()> {
        writer.commit().map_err(engine)?;
        self.reader.reload().map_err(engine)?;
        Ok(())
    }

    fn hit_from_doc(&self, doc: &TantivyDocument) -> Option<SearchHit> {
        let text = |field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        let raw_id = text(self.fields.id);
        let id = match Uuid::parse_str(&raw_id) {
            Ok(id) => id,
            Err(_) => {
                warn!(raw_id, "indexed document with unparseable id; skipping");
                return None;
            }
        };

        let tags = text(self.fields.tags)
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        Some(SearchHit {
            id,
            title: text(self.fields.title),
            content: text(self.fields.content),
            tags,
        })
    }
}

#[async_trait]
impl SearchIndex for TantivyIndex {
    async fn upsert(&self, article: &Article) -> IndexResult<()> {
        let mut writer = self.writer.lock();
        self.write_article(&writer, article)?;
        self.commit(&mut writer)
    }

    async fn remove(&self, article_id: Uuid) -> IndexResult<()> {
        let mut writer = self.writer.lock();
        writer.delete_term(self.id_term(article_id));
        self.commit(&mut writer)
    }

    async fn rebuild_all(&self, articles: &[Article]) -> IndexResult<()> {
        let mut writer = self.writer.lock();
        for article in articles {
            self.write_article(&writer, article)?;
        }
        self.commit(&mut writer)
    }

    async fn query(&self, text: &str, limit: usize) -> IndexResult<QueryOutcome> {
        if text.trim().is_empty() {
            return Ok(QueryOutcome::Hits(Vec::new()));
        }

        let searcher = self.reader.searcher();
        let parser = QueryParser::for_index(
            &self.index,
            vec![self.fields.title, self.fields.content, self.fields.tags],
        );
        // Lenient parse: a user query is never a hard error, unparseable
        // pieces just drop out. Terms combine with OR across all fields.
        let (query, _errors) = parser.parse_query_lenient(text);

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit.max(1)))
            .map_err(engine)?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address).map_err(engine)?;
            if let Some(hit) = self.hit_from_doc(&doc) {
                hits.push(hit);
            }
        }
        Ok(QueryOutcome::Hits(hits))
    }
}
