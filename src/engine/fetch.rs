//! Outbound fetching.
//!
//! # Responsibilities
//! - Issue one outbound request and hand back a streaming response
//! - Re-home replay-origin URLs onto the archive's upstream origin
//! - Report transport failures as `EngineError::Network`
//!
//! # Design Decisions
//! - Redirects are never followed by the transport; a 3xx reaches the client
//! - Response bodies are streamed; request bodies arrive already buffered

use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Response};
use url::{Origin, Url};

use crate::config::UpstreamConfig;
use crate::error::EngineError;
use crate::http::headers::strip_hop_by_hop;

/// A request about to leave the proxy.
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl OutboundRequest {
    pub fn get(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers,
            body: None,
        }
    }
}

/// Performs outbound requests for the engine and the bypass path.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `request`. `replay_origin` is the origin the client addressed.
    async fn fetch(
        &self,
        request: OutboundRequest,
        replay_origin: &Origin,
    ) -> Result<Response<Body>, EngineError>;
}

/// [`Fetcher`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    upstream: Option<Url>,
}

impl HttpFetcher {
    pub fn new(config: &UpstreamConfig) -> Result<Self, EngineError> {
        let upstream = config
            .origin
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| EngineError::config(format!("upstream origin: {e}")))?;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| EngineError::config(format!("upstream client: {e}")))?;

        Ok(Self { client, upstream })
    }

    /// The URL actually contacted for `url`.
    fn target(&self, url: &str, replay_origin: &Origin) -> Result<Url, EngineError> {
        let parsed = Url::parse(url).map_err(|e| EngineError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match &self.upstream {
            Some(upstream) if &parsed.origin() == replay_origin => {
                let mut target = upstream.clone();
                target.set_path(parsed.path());
                target.set_query(parsed.query());
                Ok(target)
            }
            _ => Ok(parsed),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        request: OutboundRequest,
        replay_origin: &Origin,
    ) -> Result<Response<Body>, EngineError> {
        let target = self.target(&request.url, replay_origin)?;
        tracing::debug!(url = %request.url, target = %target, method = %request.method, "Fetching upstream");

        let mut builder = self
            .client
            .request(request.method, target)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let upstream = builder.send().await.map_err(|e| EngineError::Network {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay_origin() -> Origin {
        Url::parse("http://localhost:8080/").unwrap().origin()
    }

    #[test]
    fn test_rehomes_replay_origin_onto_upstream() {
        let fetcher = HttpFetcher::new(&UpstreamConfig {
            origin: Some("http://127.0.0.1:9000".into()),
            ..UpstreamConfig::default()
        })
        .unwrap();

        let target = fetcher
            .target(
                "http://localhost:8080/memento/20170206002337/https://example.com/?a=b",
                &replay_origin(),
            )
            .unwrap();
        assert_eq!(
            target.as_str(),
            "http://127.0.0.1:9000/memento/20170206002337/https://example.com/?a=b"
        );
    }

    #[test]
    fn test_foreign_urls_are_untouched() {
        let fetcher = HttpFetcher::new(&UpstreamConfig {
            origin: Some("http://127.0.0.1:9000".into()),
            ..UpstreamConfig::default()
        })
        .unwrap();

        let target = fetcher.target("https://cdn.example.net/lib.js", &replay_origin()).unwrap();
        assert_eq!(target.as_str(), "https://cdn.example.net/lib.js");
    }

    #[test]
    fn test_unparseable_url_is_a_network_failure() {
        let fetcher = HttpFetcher::new(&UpstreamConfig::default()).unwrap();
        assert!(matches!(
            fetcher.target("not a url", &replay_origin()),
            Err(EngineError::Network { .. })
        ));
    }
}
