//! `quill` - command-line front end for the knowledge base core.
//!
//! Argument parsing, backend/index wiring and plain-text printing only.
//! All semantics live in `quill-core`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use quill_core::diff::{self, DiffTag};
use quill_core::{
    ArticleService, ArticleStore, BackendKind, NullIndex, QuillConfig, SearchIndex, ANONYMOUS,
};
use quill_jsonstore::JsonFileStore;
use quill_search::TantivyIndex;
use quill_sqlite::SqliteArticleStore;

#[derive(Parser)]
#[command(name = "quill", version, about = "Personal knowledge base")]
struct Cli {
    /// Optional TOML config file; flags below override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the database / collection files.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage backend.
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendChoice>,

    /// Directory for the full-text index (defaults to <data-dir>/search_index).
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Run without a full-text engine; search falls back to substring scan.
    #[arg(long, global = true)]
    no_index: bool,

    /// Attribution recorded on writes.
    #[arg(long, global = true)]
    author: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum BackendChoice {
    Sqlite,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new article.
    Add {
        title: String,
        /// Article content; read from stdin when omitted.
        #[arg(long)]
        content: Option<String>,
        /// Comma-separated tags.
        #[arg(long, default_value = "")]
        tags: String,
    },
    /// Show one article by id or title.
    Show { article: String },
    /// List articles, most recently updated first.
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Edit an article's content (and optionally title/tags).
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Full-text search (substring fallback without an index).
    Search { query: String },
    /// Show the version history of an article.
    History { id: Uuid },
    /// Diff two versions of an article by version number.
    Diff {
        id: Uuid,
        from_no: u32,
        to_no: u32,
        /// Emit the HTML rendering instead of a text diff.
        #[arg(long)]
        html: bool,
    },
    /// Restore an article to a prior version.
    Restore { id: Uuid, version_id: Uuid },
    /// Delete an article and its history.
    Delete { id: Uuid },
    /// Print the tag cloud.
    Tags,
    /// Rebuild the full-text index from storage.
    Reindex,
    /// Check the [[internal links]] of an article.
    CheckLinks { id: Uuid },
}

fn effective_config(cli: &Cli) -> Result<QuillConfig> {
    let mut config = match &cli.config {
        Some(path) => QuillConfig::load(path).context("loading config file")?,
        None => QuillConfig::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(backend) = cli.backend {
        config.backend = match backend {
            BackendChoice::Sqlite => BackendKind::Sqlite,
            BackendChoice::Json => BackendKind::JsonFile,
        };
    }
    if cli.no_index {
        config.index_dir = None;
    } else if let Some(index_dir) = &cli.index_dir {
        config.index_dir = Some(index_dir.clone());
    } else if config.index_dir.is_none() {
        config.index_dir = Some(config.data_dir.join("search_index"));
    }
    Ok(config)
}

fn build_service(config: &QuillConfig) -> Result<ArticleService> {
    let store: Arc<dyn ArticleStore> = match config.backend {
        BackendKind::Sqlite => Arc::new(
            SqliteArticleStore::open(config.sqlite_path()).context("opening SQLite store")?,
        ),
        BackendKind::JsonFile => {
            Arc::new(JsonFileStore::open(&config.data_dir).context("opening JSON file store")?)
        }
    };

    let index: Arc<dyn SearchIndex> = match &config.index_dir {
        Some(dir) => Arc::new(TantivyIndex::open_in_dir(dir).context("opening search index")?),
        None => Arc::new(NullIndex),
    };

    Ok(ArticleService::new(store, index))
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn read_stdin() -> Result<String> {
    use std::io::Read;
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("reading content from stdin")?;
    Ok(buffer)
}

async fn resolve_article(service: &ArticleService, key: &str) -> Result<quill_core::Article> {
    let found = match Uuid::parse_str(key) {
        Ok(id) => service.get(id).await?,
        Err(_) => service.get_by_title(key).await?,
    };
    match found {
        Some(article) => Ok(article),
        None => bail!("no article matching {key:?}"),
    }
}

fn print_article(article: &quill_core::Article) {
    println!("id:         {}", article.id);
    println!("title:      {}", article.title);
    println!("tags:       {}", article.tags.join(", "));
    println!("created by: {} at {}", article.created_by, article.created_at);
    println!("updated by: {} at {}", article.updated_by, article.updated_at);
    println!();
    println!("{}", article.content);
}

async fn run(cli: Cli) -> Result<()> {
    let config = effective_config(&cli)?;
    let service = build_service(&config)?;
    let author = cli.author.as_deref().unwrap_or(ANONYMOUS);

    match cli.command {
        Command::Add { title, content, tags } => {
            let content = match content {
                Some(content) => content,
                None => read_stdin()?,
            };
            let article = service
                .create(&title, &content, split_tags(&tags), author)
                .await?;
            println!("created {}", article.id);
        }
        Command::Show { article } => {
            let article = resolve_article(&service, &article).await?;
            print_article(&article);
        }
        Command::List { limit, tag } => {
            let articles = match tag {
                Some(tag) => service.list_by_tag(&tag).await?,
                None => service.list(limit).await?,
            };
            for article in articles {
                println!("{}  {}  [{}]", article.id, article.title, article.tags.join(", "));
            }
        }
        Command::Edit { id, title, content, tags } => {
            let current = service
                .get(id)
                .await?
                .with_context(|| format!("no article {id}"))?;
            let title = title.unwrap_or(current.title);
            let content = match content {
                Some(content) => content,
                None => current.content,
            };
            let tags = match tags {
                Some(raw) => split_tags(&raw),
                None => current.tags,
            };
            service.update(id, &title, &content, tags, author).await?;
            println!("updated {id}");
        }
        Command::Search { query } => {
            for hit in service.search(&query).await? {
                println!("{}  {}  [{}]", hit.id, hit.title, hit.tags.join(", "));
            }
        }
        Command::History { id } => {
            for version in service.versions(id).await? {
                println!(
                    "v{:<4} {}  {}  by {}",
                    version.version_no, version.id, version.edited_at, version.edited_by
                );
            }
        }
        Command::Diff { id, from_no, to_no, html } => {
            let versions = service.versions(id).await?;
            let pick = |no: u32| {
                versions
                    .iter()
                    .find(|v| v.version_no == no)
                    .with_context(|| format!("article {id} has no version {no}"))
            };
            let from = pick(from_no)?;
            let to = pick(to_no)?;

            if html {
                println!("{}", diff::render_html(&from.content, &to.content));
            } else {
                for line in diff::diff(&from.content, &to.content) {
                    let marker = match line.tag {
                        DiffTag::Removed => '-',
                        DiffTag::Added => '+',
                        DiffTag::Unchanged => ' ',
                    };
                    println!("{marker} {}", line.text);
                }
            }
        }
        Command::Restore { id, version_id } => {
            if service.restore(id, version_id).await? {
                println!("restored {id} to version {version_id}");
            } else {
                bail!("nothing restored: unknown article or version");
            }
        }
        Command::Delete { id } => {
            service.delete(id).await?;
            println!("deleted {id}");
        }
        Command::Tags => {
            for entry in service.tag_cloud().await? {
                println!(
                    "{:<24} {:>4}  {}  {}",
                    entry.tag,
                    entry.count,
                    entry.color,
                    entry.size.css_class()
                );
            }
        }
        Command::Reindex => {
            let count = service.rebuild_index().await?;
            println!("indexed {count} articles");
        }
        Command::CheckLinks { id } => {
            let article = service
                .get(id)
                .await?
                .with_context(|| format!("no article {id}"))?;
            let report = service.validate_links(&article.content).await?;
            println!("{} links, {} missing", report.total, report.missing.len());
            for title in &report.missing {
                println!("missing: [[{title}]]");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    run(Cli::parse()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("a, b , ,c"), vec!["a", "b", "c"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
