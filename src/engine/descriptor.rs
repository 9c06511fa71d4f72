//! Per-request descriptors.

use axum::http::{header, request, HeaderMap, HeaderValue, Method};
use url::Origin;

use crate::http::headers::strip_hop_by_hop;

/// How the client intends to use the response (`Sec-Fetch-Mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Top-level page load.
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
    WebSocket,
}

impl NavigationMode {
    /// Read the mode from request headers.
    ///
    /// Without `Sec-Fetch-Mode` a request whose `Accept` header leads with
    /// `text/html` counts as a navigation, anything else as `no-cors`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        if let Some(mode) = header_str(headers.get("sec-fetch-mode")) {
            return match mode.trim().to_ascii_lowercase().as_str() {
                "navigate" => NavigationMode::Navigate,
                "same-origin" => NavigationMode::SameOrigin,
                "cors" => NavigationMode::Cors,
                "websocket" => NavigationMode::WebSocket,
                _ => NavigationMode::NoCors,
            };
        }

        let accepts_html = header_str(headers.get(header::ACCEPT))
            .is_some_and(|accept| accept.trim_start().starts_with("text/html"));
        if accepts_html {
            NavigationMode::Navigate
        } else {
            NavigationMode::NoCors
        }
    }

    pub fn is_navigate(self) -> bool {
        self == NavigationMode::Navigate
    }
}

/// One intercepted request. Owned by the task handling it and never mutated.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Absolute target URL.
    pub url: String,
    /// Referring page URL, empty when the client sent none.
    pub referrer: String,
    pub mode: NavigationMode,
    /// End-to-end request headers.
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    /// A request with no referrer, no headers and `no-cors` mode.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            referrer: String::new(),
            mode: NavigationMode::NoCors,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = referrer.into();
        self
    }

    pub fn with_mode(mut self, mode: NavigationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Describe an incoming proxy request.
    ///
    /// Absolute-form targets (forward proxy use) are kept as sent; origin-form
    /// targets are placed on the replay origin.
    pub fn from_parts(parts: &request::Parts, replay_origin: &Origin) -> Self {
        let url = if parts.uri.scheme().is_some() {
            parts.uri.to_string()
        } else {
            let path = parts
                .uri
                .path_and_query()
                .map_or("/", |pq| pq.as_str());
            format!("{}{}", replay_origin.ascii_serialization(), path)
        };

        let referrer = header_str(parts.headers.get(header::REFERER))
            .unwrap_or_default()
            .to_string();

        let mut headers = parts.headers.clone();
        strip_hop_by_hop(&mut headers);

        Self {
            method: parts.method.clone(),
            url,
            referrer,
            mode: NavigationMode::from_headers(&parts.headers),
            headers,
        }
    }
}

fn header_str(value: Option<&HeaderValue>) -> Option<&str> {
    value.and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use url::Url;

    fn origin() -> Origin {
        Url::parse("http://localhost:8080/").unwrap().origin()
    }

    #[test]
    fn test_origin_form_is_placed_on_replay_origin() {
        let (parts, _) = Request::builder()
            .uri("/style.css?v=1")
            .header("Referer", "http://localhost:8080/memento/20170206002337/https://example.com/")
            .header("Sec-Fetch-Mode", "no-cors")
            .header("Connection", "keep-alive")
            .body(())
            .unwrap()
            .into_parts();

        let request = RequestDescriptor::from_parts(&parts, &origin());
        assert_eq!(request.url, "http://localhost:8080/style.css?v=1");
        assert_eq!(
            request.referrer,
            "http://localhost:8080/memento/20170206002337/https://example.com/"
        );
        assert_eq!(request.mode, NavigationMode::NoCors);
        assert!(request.headers.get("connection").is_none());
    }

    #[test]
    fn test_absolute_form_is_kept() {
        let (parts, _) = Request::builder()
            .uri("https://cdn.example.net/lib.js")
            .body(())
            .unwrap()
            .into_parts();

        let request = RequestDescriptor::from_parts(&parts, &origin());
        assert_eq!(request.url, "https://cdn.example.net/lib.js");
        assert_eq!(request.referrer, "");
    }

    #[test]
    fn test_navigation_mode_fallback() {
        let mut headers = HeaderMap::new();
        assert_eq!(NavigationMode::from_headers(&headers), NavigationMode::NoCors);

        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        assert_eq!(NavigationMode::from_headers(&headers), NavigationMode::Navigate);

        headers.insert("sec-fetch-mode", HeaderValue::from_static("cors"));
        assert_eq!(NavigationMode::from_headers(&headers), NavigationMode::Cors);
    }
}
