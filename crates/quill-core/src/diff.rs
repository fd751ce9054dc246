//! Line-level diffs between two content blobs.
//!
//! A pure function over two strings: no storage access, no side effects.
//! The comparison is a classic line-oriented LCS diff over `\n`-split lines
//! with no word- or character-level refinement. Rendering escapes every
//! line, whether or not the underlying content was already sanitized, so the
//! diff view can never reintroduce markup.

use similar::{ChangeTag, TextDiff};

/// Classification of one line of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    Unchanged,
    Added,
    Removed,
}

/// One line of diff output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: DiffTag,
    pub text: String,
}

/// Compare two content blobs line by line.
///
/// Old-side lines appear as `Removed`, new-side lines as `Added`, common
/// lines once as `Unchanged`, in sequence order. `diff(x, x)` is all
/// `Unchanged`; keeping the `Unchanged` and `Added` lines of `diff(x, y)`
/// reproduces `y`'s lines in order.
pub fn diff(old_text: &str, new_text: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = old_text.split('\n').collect();
    let new_lines: Vec<&str> = new_text.split('\n').collect();

    TextDiff::from_slices(&old_lines, &new_lines)
        .iter_all_changes()
        .map(|change| {
            let tag = match change.tag() {
                ChangeTag::Equal => DiffTag::Unchanged,
                ChangeTag::Insert => DiffTag::Added,
                ChangeTag::Delete => DiffTag::Removed,
            };
            DiffLine {
                tag,
                text: change.value().to_string(),
            }
        })
        .collect()
}

/// Render a diff as HTML, one tagged `<div>` per line.
pub fn render_html(old_text: &str, new_text: &str) -> String {
    let rendered: Vec<String> = diff(old_text, new_text)
        .into_iter()
        .map(|line| {
            let escaped = escape_html(&line.text);
            match line.tag {
                DiffTag::Removed => format!(
                    r#"<div class="diff-removed"><span class="diff-marker">-</span> {escaped}</div>"#
                ),
                DiffTag::Added => format!(
                    r#"<div class="diff-added"><span class="diff-marker">+</span> {escaped}</div>"#
                ),
                DiffTag::Unchanged => format!(
                    r#"<div class="diff-unchanged"><span class="diff-marker"></span> {escaped}</div>"#
                ),
            }
        })
        .collect();
    rendered.join("\n")
}

/// Escape text for safe embedding in HTML.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
