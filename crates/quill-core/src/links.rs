//! Internal `[[Title]]` link handling.
//!
//! Rendering does not check whether the target article exists; a link to a
//! missing title renders like any other and is only flagged by
//! [`crate::service::ArticleService::validate_links`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("internal link regex"));

/// Classification of the `[[...]]` occurrences in a piece of content.
///
/// `valid` keeps one entry per occurrence; `missing` is deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkReport {
    pub valid: Vec<String>,
    pub missing: Vec<String>,
    pub total: usize,
}

impl LinkReport {
    pub fn has_missing(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// Extract the trimmed titles of all `[[Title]]` occurrences, in order.
pub fn extract(content: &str) -> Vec<String> {
    LINK_RE
        .captures_iter(content)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

/// Replace each `[[Title]]` with an internal hyperlink to the view route.
pub fn render(content: &str) -> String {
    LINK_RE
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let title = caps[1].trim();
            format!(
                r#"<a class="internal-link" href="/articles/view?title={}">{}</a>"#,
                urlencoding::encode(title),
                title
            )
        })
        .into_owned()
}
