//! Targeted HTML substitutions.
//!
//! Attribute-level regex passes, not a DOM rewrite: only `href`/`src` of `<a>`
//! and `<iframe>` carrying an absolute `http(s)` URL are touched. References
//! inside comments or script text that happen to look like such a tag are
//! rewritten as well.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::memento::UrimPattern;

static ABSOLUTE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<(?:iframe|a)\b[^>]*?\s(?:src|href)\s*=\s*["']?)(https?://[^'"\s>]+)"#)
        .expect("absolute reference regex")
});

static BODY_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</body\s*>").expect("body end regex"));

static HTML_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</html\s*>").expect("html end regex"));

/// Point absolute `<a>`/`<iframe>` references at mementos captured at `datetime`.
///
/// References that already are URI-Ms under `pattern` are left alone, so a
/// second pass over rewritten content changes nothing.
pub fn rewrite_absolute_references<'a>(body: &'a str, pattern: &UrimPattern, datetime: &str) -> Cow<'a, str> {
    ABSOLUTE_REFERENCE.replace_all(body, |caps: &Captures<'_>| {
        let url = &caps[2];
        if pattern.is_match(url) {
            caps[0].to_string()
        } else {
            format!("{}{}", &caps[1], pattern.synthesize(datetime, url))
        }
    })
}

/// Insert `markup` before the first `</body>`, else before the first `</html>`,
/// else at the end.
pub fn inject_markup(body: &str, markup: &str) -> String {
    let at = BODY_END
        .find(body)
        .or_else(|| HTML_END.find(body))
        .map_or(body.len(), |m| m.start());

    let mut out = String::with_capacity(body.len() + markup.len());
    out.push_str(&body[..at]);
    out.push_str(markup);
    out.push_str(&body[at..]);
    out
}

/// Escape text for use in HTML content or a double-quoted attribute.
pub fn escape_html(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '"', '<', '>']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
