//! Header manipulation.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers before forwarding in either direction
//! - Prepare cloned client headers for a memento fetch
//!
//! # Design Decisions
//! - Headers named by `Connection` are treated as hop-by-hop too
//! - Memento fetches ask for identity encoding so HTML can be rewritten

use axum::http::{header, HeaderMap, HeaderName};

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    headers.remove("proxy-connection");
}

/// Client headers cleaned up for an outbound memento fetch.
pub fn memento_request_headers(original: &HeaderMap) -> HeaderMap {
    let mut headers = original.clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::ACCEPT_ENCODING);
    headers.remove(header::CONTENT_LENGTH);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_strips_connection_named_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("close, x-private"));
        headers.insert("x-private", HeaderValue::from_static("1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));

        strip_hop_by_hop(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::ACCEPT));
    }

    #[test]
    fn test_memento_headers_request_identity_encoding() {
        let mut original = HeaderMap::new();
        original.insert(header::HOST, HeaderValue::from_static("localhost:8080"));
        original.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, br"));
        original.insert(header::COOKIE, HeaderValue::from_static("a=b"));

        let headers = memento_request_headers(&original);
        assert!(!headers.contains_key(header::HOST));
        assert!(!headers.contains_key(header::ACCEPT_ENCODING));
        assert_eq!(headers[header::COOKIE], "a=b");
    }
}
