//! Strip HTML tags Telegram's parse_mode=HTML does not accept.
//!
//! Telegram rejects the whole sendMessage call when the text contains an
//! unsupported tag, so everything outside the supported set is removed before
//! sending. Best effort: tag-like patterns are matched with a single regex
//! pass, no nesting validation.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Tags Telegram renders in HTML mode.
const ALLOWED_TAGS: [&str; 8] = ["b", "i", "u", "s", "a", "code", "pre", "blockquote"];

/// `<` optional `/`, tag name (letter then letters/digits), any attributes, `>`.
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").expect("tag regex"));

fn is_allowed(tag: &str) -> bool {
    ALLOWED_TAGS.iter().any(|t| tag.eq_ignore_ascii_case(t))
}

/// Remove every HTML-like tag whose name is not in the allowed set.
/// Allowed tags pass through unchanged, attributes included.
pub fn sanitize(text: &str) -> Cow<'_, str> {
    TAG_RE.replace_all(text, |caps: &Captures| {
        if is_allowed(&caps[1]) {
            caps[0].to_string()
        } else {
            String::new()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_untouched() {
        assert_eq!(sanitize("2 < 3 and 4 > 1"), "2 < 3 and 4 > 1");
    }

    #[test]
    fn allowed_tags_kept() {
        let input = "<b>bold</b> and <code>x = 1</code>";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn allowed_tag_keeps_attributes() {
        let input = r#"see <a href="https://example.com">here</a>"#;
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn disallowed_tags_removed_open_and_close() {
        assert_eq!(
            sanitize("<html><p>hello <span class=\"x\">world</span></p></html>"),
            "hello world"
        );
    }

    #[test]
    fn tag_names_compared_case_insensitively() {
        assert_eq!(sanitize("<B>bold</B> <DIV>gone</DIV>"), "<B>bold</B> gone");
    }

    #[test]
    fn idempotent() {
        let input = "<h1>Title</h1> <b>keep</b> <script>alert(1)</script>";
        let once = sanitize(input).into_owned();
        let twice = sanitize(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn br_and_self_closing_removed() {
        assert_eq!(sanitize("line<br/>break <img src=\"x\"/>"), "linebreak ");
    }
}
