//! Allow-list HTML sanitization.
//!
//! Every piece of content passes through [`sanitize`] before it is handed to
//! a storage backend; nothing downstream ever sees raw input. The allow-list
//! covers basic inline and block markup (emphasis, links, lists, headings,
//! code, blockquote) and, for anchors, a fixed attribute set.
//!
//! Built without the `sanitize` feature the function fails open: content is
//! returned unchanged and a warning is logged, so the degraded security
//! posture is observable rather than silent.

/// Sanitize HTML content, stripping everything outside the allow-list.
///
/// Never fails; empty input returns empty output. Idempotent:
/// `sanitize(sanitize(x)) == sanitize(x)`.
#[cfg(feature = "sanitize")]
pub fn sanitize(raw: &str) -> String {
    use std::collections::{HashMap, HashSet};

    if raw.is_empty() {
        return String::new();
    }

    let tags: HashSet<&str> = [
        "a", "b", "strong", "i", "em", "u", "p", "br", "ul", "ol", "li", "h1", "h2", "h3", "h4",
        "pre", "code", "blockquote",
    ]
    .into_iter()
    .collect();

    let mut tag_attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    tag_attributes.insert("a", ["href", "title", "target", "rel"].into_iter().collect());

    let mut builder = ammonia::Builder::default();
    builder
        .tags(tags)
        .tag_attributes(tag_attributes)
        .generic_attributes(std::collections::HashSet::new())
        // Caller-supplied rel attributes survive the allow-list; ammonia
        // would otherwise insist on rewriting them.
        .link_rel(None);

    builder.clean(raw).to_string()
}

/// Fail-open passthrough used when the sanitizer is compiled out.
#[cfg(not(feature = "sanitize"))]
pub fn sanitize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    tracing::warn!("html sanitizer disabled at build time; storing content unsanitized");
    raw.to_string()
}

#[cfg(all(test, feature = "sanitize"))]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_empty_output() {
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(sanitize("just words"), "just words");
    }

    #[test]
    fn test_script_is_stripped() {
        let cleaned = sanitize("before<script>alert(1)</script>after");
        assert!(!cleaned.contains("script"));
        assert!(!cleaned.contains("alert"));
        assert!(cleaned.contains("before"));
        assert!(cleaned.contains("after"));
    }

    #[test]
    fn test_allowed_markup_survives() {
        let cleaned = sanitize("<p>a <strong>bold</strong> and <em>plain</em> claim</p>");
        assert!(cleaned.contains("<strong>bold</strong>"));
        assert!(cleaned.contains("<em>plain</em>"));
        assert!(cleaned.contains("<p>"));
    }

    #[test]
    fn test_anchor_keeps_allowed_attributes() {
        let cleaned = sanitize(r#"<a href="https://example.com" title="t" rel="noopener">x</a>"#);
        assert!(cleaned.contains(r#"href="https://example.com""#));
        assert!(cleaned.contains(r#"title="t""#));
        assert!(cleaned.contains(r#"rel="noopener""#));
    }

    #[test]
    fn test_disallowed_attributes_dropped() {
        let cleaned = sanitize(r#"<a href="/x" onclick="evil()">x</a><p style="color:red">y</p>"#);
        assert!(!cleaned.contains("onclick"));
        assert!(!cleaned.contains("style"));
        assert!(cleaned.contains(r#"href="/x""#));
    }

    #[test]
    fn test_disallowed_tag_keeps_inner_text() {
        let cleaned = sanitize("<table><tr><td>cell</td></tr></table>");
        assert!(!cleaned.contains("<table>"));
        assert!(cleaned.contains("cell"));
    }

    #[test]
    fn test_internal_link_markers_untouched() {
        assert_eq!(sanitize("See [[Getting Started]]"), "See [[Getting Started]]");
    }

    #[test]
    fn test_idempotence() {
        let inputs = [
            "<p>hello <b>world</b></p>",
            "<script>x</script>plain & <div>nested <em>ok</em></div>",
            r#"<a href="https://a.b" target="_blank">link</a> "quotes" <h5>gone</h5>"#,
            "unclosed <strong>tail",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
        }
    }
}
