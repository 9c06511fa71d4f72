//! `Link` header relation parsing.
//!
//! Extracts navigation relations (`first`, `last`, `prev`, `next`, ...) from an
//! RFC 8288 `Link` header. A link declaring several relation tokens is
//! registered under each of them; a later link wins over an earlier one.

use std::collections::HashMap;

use axum::http::{header, HeaderMap};

use crate::error::EngineError;

/// Target of one relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub href: String,
    pub datetime: Option<String>,
}

/// Relation token to target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationMap {
    relations: HashMap<String, Relation>,
}

impl RelationMap {
    pub fn get(&self, rel: &str) -> Option<&Relation> {
        self.relations.get(rel)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    fn insert(&mut self, rel: &str, relation: Relation) {
        self.relations.insert(rel.to_string(), relation);
    }
}

/// Parse one `Link` header value.
///
/// Segments that cannot be used (no `>` closing the target, no `rel`) are
/// dropped; the remaining segments are still parsed.
pub fn parse_link_header(value: &str) -> RelationMap {
    let normalized = value.replace(['\r', '\n'], " ");
    let mut relations = RelationMap::default();

    // Text before the first `<` carries no link.
    for segment in split_unquoted(&normalized, '<').into_iter().skip(1) {
        match parse_segment(segment) {
            Ok((href, rels, datetime)) => {
                for rel in rels.split_whitespace() {
                    relations.insert(
                        rel,
                        Relation {
                            href: href.to_string(),
                            datetime: datetime.map(str::to_string),
                        },
                    );
                }
            }
            Err(e) => tracing::debug!(error = %e, "Dropping Link segment"),
        }
    }
    relations
}

/// Relations from every `Link` header of a response, in header order.
pub fn relations_from_headers(headers: &HeaderMap) -> RelationMap {
    let joined = headers
        .get_all(header::LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join(", ");
    parse_link_header(&joined)
}

/// `(href, rel, datetime)` of one segment.
fn parse_segment(segment: &str) -> Result<(&str, &str, Option<&str>), EngineError> {
    let (href, params) = segment
        .split_once('>')
        .ok_or_else(|| EngineError::MalformedLinkHeader(segment.trim().to_string()))?;

    let mut rel = None;
    let mut datetime = None;
    for param in split_unquoted(params, ';') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value
            .trim()
            .trim_end_matches(',')
            .trim_end()
            .trim_matches('"');
        match key.trim().to_ascii_lowercase().as_str() {
            "rel" => rel = Some(value),
            "datetime" => datetime = Some(value),
            _ => {}
        }
    }

    match rel {
        Some(rel) if !rel.trim().is_empty() => Ok((href.trim(), rel, datetime)),
        _ => Err(EngineError::MalformedLinkHeader(segment.trim().to_string())),
    }
}

/// Split on `delimiter` outside double quotes.
fn split_unquoted(input: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (at, c) in input.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == delimiter && !quoted {
            parts.push(&input[start..at]);
            start = at + c.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_multiple_tokens_per_link() {
        let relations = parse_link_header(
            r#"<https://a/1>; rel="first memento"; datetime="Mon, 06 Feb 2017 00:23:37 GMT", <https://a/2>; rel="last memento"; datetime="Tue, 07 Feb 2017 00:00:00 GMT""#,
        );

        let first = relations.get("first").unwrap();
        assert_eq!(first.href, "https://a/1");
        assert_eq!(first.datetime.as_deref(), Some("Mon, 06 Feb 2017 00:23:37 GMT"));

        let last = relations.get("last").unwrap();
        assert_eq!(last.href, "https://a/2");
        assert_eq!(last.datetime.as_deref(), Some("Tue, 07 Feb 2017 00:00:00 GMT"));

        // Shared token: the later link wins.
        assert_eq!(relations.get("memento").unwrap().href, "https://a/2");
        assert_eq!(relations.len(), 3);
    }

    #[test]
    fn test_newlines_and_unquoted_values() {
        let relations = parse_link_header(
            "<https://a/orig>; rel=original,\r\n <https://a/map>; rel=timemap; type=\"application/link-format\",\n <https://a/3>; rel=\"prev memento\"",
        );
        assert_eq!(relations.get("original").unwrap().href, "https://a/orig");
        assert_eq!(relations.get("timemap").unwrap().href, "https://a/map");
        assert_eq!(relations.get("prev").unwrap().href, "https://a/3");
        assert_eq!(relations.get("prev").unwrap().datetime, None);
    }

    #[test]
    fn test_segment_without_rel_is_dropped() {
        let relations = parse_link_header(
            r#"<https://a/1>; datetime="Mon, 06 Feb 2017 00:23:37 GMT", <https://a/2>; rel="next memento""#,
        );
        assert!(relations.get("first").is_none());
        assert_eq!(relations.get("next").unwrap().href, "https://a/2");
        assert_eq!(relations.len(), 2);
    }

    #[test]
    fn test_garbage_yields_nothing() {
        assert!(parse_link_header("").is_empty());
        assert!(parse_link_header("not a link header").is_empty());
        assert!(parse_link_header("<https://a/unterminated; rel=next").is_empty());
    }

    #[test]
    fn test_multiple_headers_are_combined() {
        let mut headers = HeaderMap::new();
        headers.append(header::LINK, HeaderValue::from_static(r#"<https://a/1>; rel="first""#));
        headers.append(header::LINK, HeaderValue::from_static(r#"<https://a/2>; rel="last""#));

        let relations = relations_from_headers(&headers);
        assert_eq!(relations.get("first").unwrap().href, "https://a/1");
        assert_eq!(relations.get("last").unwrap().href, "https://a/2");
    }
}
