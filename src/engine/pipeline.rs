//! Request interception pipeline.
//!
//! # Responsibilities
//! - Run the exclusion filter before anything else
//! - Fetch requests that already are URI-Ms, with the provenance header
//! - Redirect every other request locally to its reconstructed URI-M
//! - Hand successful HTML responses to the rewriter
//!
//! # Design Decisions
//! - Each call works on one settings snapshot; a reconfiguration only affects
//!   requests that start after it
//! - Every branch ends in a response or an explicit bypass, never an error
//! - Rewriting runs on a fully buffered body or not at all

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::http::{header, HeaderMap, Response};

use crate::config::EngineConfig;
use crate::engine::descriptor::RequestDescriptor;
use crate::engine::fetch::{Fetcher, OutboundRequest};
use crate::engine::responses::{local_redirect, service_unavailable};
use crate::engine::settings::Settings;
use crate::error::EngineError;
use crate::exclusion::ExclusionFilter;
use crate::http::headers::memento_request_headers;
use crate::memento::resolve_urir;
use crate::observability::metrics;
use crate::rewrite::{ArchivalRewriter, HtmlRewriter, RewriteContext};

/// Bypass reason used when the referrer cannot supply a memento context.
pub const NO_MEMENTO_CONTEXT: &str = "no_memento_context";

/// What the pipeline decided for one request.
#[derive(Debug)]
pub enum Disposition {
    /// The engine is not involved; default request handling applies.
    Bypass { reason: String },
    /// Serve this response to the client.
    Respond(Response<Body>),
}

/// The archival rerouting engine.
pub struct Engine {
    settings: ArcSwap<Settings>,
    exclusions: ExclusionFilter,
    rewriter: Arc<dyn HtmlRewriter>,
    fetcher: Arc<dyn Fetcher>,
}

impl Engine {
    /// Create an engine with the default exclusions and rewriter.
    pub fn new(config: &EngineConfig, fetcher: Arc<dyn Fetcher>) -> Result<Self, EngineError> {
        let settings = Settings::compile(config)?;
        tracing::info!(
            id = %settings.id(),
            urim_template = %settings.pattern().template(),
            replay_origin = %settings.replay_origin().ascii_serialization(),
            banner = settings.banner().enabled,
            "Engine initialized"
        );

        Ok(Self {
            settings: ArcSwap::from_pointee(settings),
            exclusions: ExclusionFilter::default(),
            rewriter: Arc::new(ArchivalRewriter::default()),
            fetcher,
        })
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Arc<Settings> {
        self.settings.load_full()
    }

    /// Replace the settings wholesale.
    ///
    /// An invalid configuration is rejected and the current settings stay active.
    pub fn reconfigure(&self, config: &EngineConfig) -> Result<(), EngineError> {
        let settings = Settings::compile(config)?;
        tracing::info!(
            urim_template = %settings.pattern().template(),
            banner = settings.banner().enabled,
            "Engine reconfigured"
        );
        self.settings.store(Arc::new(settings));
        Ok(())
    }

    pub fn exclusions(&self) -> &ExclusionFilter {
        &self.exclusions
    }

    /// Exclusions can only be changed while the engine is being set up.
    pub fn exclusions_mut(&mut self) -> &mut ExclusionFilter {
        &mut self.exclusions
    }

    /// Substitute the HTML rewriting strategy.
    pub fn set_rewriter(&mut self, rewriter: Arc<dyn HtmlRewriter>) {
        self.rewriter = rewriter;
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    /// Decide and produce the response for one intercepted request.
    pub async fn reroute(&self, request: &RequestDescriptor) -> Disposition {
        let settings = self.settings();
        self.reroute_with(&settings, request).await
    }

    /// [`Engine::reroute`] against an explicit settings snapshot.
    pub async fn reroute_with(&self, settings: &Settings, request: &RequestDescriptor) -> Disposition {
        let started = Instant::now();

        if let Some(exclusion) = self.exclusions.first_match(request, settings) {
            decision!(settings, exclusion, url = %request.url, "Exclusion found");
            metrics::record_disposition("bypass", started);
            return Disposition::Bypass {
                reason: exclusion.to_string(),
            };
        }

        if settings.pattern().is_match(&request.url) {
            let response = self.fetch_memento(settings, request).await;
            let disposition = if response.extensions().get::<Synthetic>().is_some() {
                "unavailable"
            } else {
                "fetched"
            };
            metrics::record_disposition(disposition, started);
            return Disposition::Respond(response);
        }

        match self.reconstruct(settings, request) {
            Ok(urim) => {
                decision!(settings, url = %request.url, urim = %urim, "Locally redirecting");
                match local_redirect(&urim) {
                    Some(response) => {
                        metrics::record_disposition("redirect", started);
                        Disposition::Respond(response)
                    }
                    None => {
                        tracing::warn!(urim = %urim, "URI-M cannot be used as a Location");
                        metrics::record_disposition("unavailable", started);
                        Disposition::Respond(unavailable())
                    }
                }
            }
            Err(e) => {
                decision!(settings, url = %request.url, error = %e, "Referrer is not a memento");
                metrics::record_disposition("bypass", started);
                Disposition::Bypass {
                    reason: NO_MEMENTO_CONTEXT.to_string(),
                }
            }
        }
    }

    /// The URI-M a non-memento request should be redirected to.
    pub fn reconstruct(&self, settings: &Settings, request: &RequestDescriptor) -> Result<String, EngineError> {
        let referrer = settings.pattern().extract(&request.referrer)?;
        let urir = resolve_urir(&request.url, referrer.urir, settings.replay_origin());
        Ok(settings.pattern().synthesize(referrer.datetime, &urir))
    }

    async fn fetch_memento(&self, settings: &Settings, request: &RequestDescriptor) -> Response<Body> {
        let mut headers = memento_request_headers(&request.headers);
        let (name, value) = settings.provenance();
        headers.insert(name.clone(), value.clone());

        let outbound = OutboundRequest::get(request.url.clone(), headers);
        match self.fetcher.fetch(outbound, settings.replay_origin()).await {
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "Memento fetch failed");
                unavailable()
            }
            Ok(response) => {
                metrics::record_upstream_status(response.status().as_u16());
                decision!(settings, url = %request.url, status = %response.status(), "Fetched from upstream");
                if response.status().is_success() {
                    self.rewrite(settings, request, response).await
                } else {
                    response
                }
            }
        }
    }

    async fn rewrite(&self, settings: &Settings, request: &RequestDescriptor, response: Response<Body>) -> Response<Body> {
        if !is_html(response.headers()) {
            return response;
        }
        if is_encoded(response.headers()) {
            tracing::debug!(url = %request.url, "Encoded HTML body left as is");
            return response;
        }
        let Ok(memento) = settings.pattern().extract(&request.url) else {
            return response;
        };

        if declared_length(response.headers()).is_some_and(|len| len > settings.max_rewrite_bytes()) {
            decision!(settings, url = %request.url, "HTML body over rewrite limit, passed through");
            return response;
        }

        let (mut parts, body) = response.into_parts();
        let bytes = match axum::body::to_bytes(body, settings.max_rewrite_bytes()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "Failed to buffer HTML body");
                return unavailable();
            }
        };
        let text = String::from_utf8_lossy(&bytes);

        let context = RewriteContext {
            settings,
            datetime: memento.datetime,
            urir: memento.urir,
            headers: &parts.headers,
            mode: request.mode,
        };
        let rewritten = self.rewriter.rewrite(&text, &context);
        let banner = context.wants_banner();
        metrics::record_rewrite(banner);
        decision!(settings, url = %request.url, banner, "Rewrote HTML body");

        parts.headers.remove(header::CONTENT_LENGTH);
        Response::from_parts(parts, Body::from(rewritten))
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers.get(header::CONTENT_LENGTH)?.to_str().ok()?.trim().parse().ok()
}

/// Marks responses synthesized by the engine.
#[derive(Debug, Clone, Copy)]
struct Synthetic;

fn unavailable() -> Response<Body> {
    let mut response = service_unavailable();
    response.extensions_mut().insert(Synthetic);
    response
}

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("text/html"))
}

fn is_encoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.trim().eq_ignore_ascii_case("identity"))
}
