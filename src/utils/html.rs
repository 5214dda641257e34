//! HTML text helpers.
//!
//! Tag injection works on the finished text rather than a parsed tree, so
//! these helpers only escape attribute values and splice strings around
//! closing tags.

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require escaping inside a quoted attribute value.
const ESCAPE_CHARS: [char; 4] = ['<', '>', '&', '"'];

#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        _ => None,
    }
}

/// Escape a double-quoted attribute value.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

// =============================================================================
// Splicing
// =============================================================================

/// Insert `fragment` right before the first occurrence of `marker`.
///
/// Returns `false` (and leaves `html` untouched) when the marker is absent.
pub fn insert_before_first(html: &mut String, marker: &str, fragment: &str) -> bool {
    match html.find(marker) {
        Some(index) => {
            html.insert_str(index, fragment);
            true
        }
        None => false,
    }
}

/// Insert `fragment` right before the last occurrence of `marker`.
///
/// Returns `false` (and leaves `html` untouched) when the marker is absent.
pub fn insert_before_last(html: &mut String, marker: &str, fragment: &str) -> bool {
    match html.rfind(marker) {
        Some(index) => {
            html.insert_str(index, fragment);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("plain"), "plain");
        assert!(matches!(escape_attr("plain"), Cow::Borrowed(_)));
        assert_eq!(escape_attr(r#"a "b" & <c>"#), "a &quot;b&quot; &amp; &lt;c&gt;");
        assert_eq!(escape_attr("it's"), "it's");
    }

    #[test]
    fn test_insert_before_first() {
        let mut html = "<head></head><body><head></head>".to_string();
        assert!(insert_before_first(&mut html, "</head>", "<x>"));
        assert_eq!(html, "<head><x></head><body><head></head>");
    }

    #[test]
    fn test_insert_before_last() {
        let mut html = "<body><template></body></template></body>".to_string();
        assert!(insert_before_last(&mut html, "</body>", "<x>"));
        assert_eq!(html, "<body><template></body></template><x></body>");
    }

    #[test]
    fn test_insert_missing_marker() {
        let mut html = "<p>fragment</p>".to_string();
        assert!(!insert_before_first(&mut html, "</head>", "<x>"));
        assert!(!insert_before_last(&mut html, "</body>", "<x>"));
        assert_eq!(html, "<p>fragment</p>");
    }
}
