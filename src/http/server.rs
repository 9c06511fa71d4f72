//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the catch-all replay handler
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Turn each request into a descriptor and run it through the engine
//! - Forward bypassed requests unmodified
//! - Apply configuration updates and spawn the admin listener

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::admin::setup_admin_router;
use crate::config::ReplayConfig;
use crate::engine::{Disposition, Engine, HttpFetcher, OutboundRequest, RequestDescriptor, Settings};
use crate::error::EngineError;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::lifecycle::signalled;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub max_body_bytes: usize,
}

/// HTTP server for the replay proxy.
pub struct HttpServer {
    router: Router,
    config: ReplayConfig,
    engine: Arc<Engine>,
}

impl HttpServer {
    /// Create a server with the default engine and an HTTP fetcher.
    pub fn new(config: ReplayConfig) -> Result<Self, EngineError> {
        let fetcher = Arc::new(HttpFetcher::new(&config.upstream)?);
        let engine = Arc::new(Engine::new(&config.engine, fetcher)?);
        Ok(Self::with_engine(config, engine))
    }

    /// Create a server around an already configured engine.
    pub fn with_engine(config: ReplayConfig, engine: Arc<Engine>) -> Self {
        let state = AppState {
            engine: engine.clone(),
            max_body_bytes: config.listener.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config, engine }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ReplayConfig, state: AppState) -> Router {
        let timeout = Duration::from_secs(
            config.upstream.connect_timeout_secs + config.upstream.request_timeout_secs,
        );

        Router::new()
            .route("/{*path}", any(replay_handler))
            .route("/", any(replay_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TimeoutLayer::new(timeout))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` reconfigure the engine;
    /// listener, upstream and admin changes need a restart.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ReplayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.admin.enabled {
            self.spawn_admin(shutdown.resubscribe()).await;
        }

        tokio::spawn(apply_updates(
            self.engine.clone(),
            self.config.clone(),
            config_updates,
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signalled(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    async fn spawn_admin(&self, shutdown: broadcast::Receiver<()>) {
        let admin = &self.config.admin;
        let listener = match TcpListener::bind(&admin.bind_address).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(address = %admin.bind_address, error = %e, "Failed to bind admin listener");
                return;
            }
        };
        tracing::info!(address = %admin.bind_address, "Admin endpoint listening");

        let router = setup_admin_router(self.engine.clone(), &admin.api_key);
        tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(signalled(shutdown))
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "Admin endpoint failed");
            }
        });
    }
}

async fn apply_updates(
    engine: Arc<Engine>,
    mut current: ReplayConfig,
    mut config_updates: mpsc::UnboundedReceiver<ReplayConfig>,
) {
    while let Some(config) = config_updates.recv().await {
        match engine.reconfigure(&config.engine) {
            Ok(()) => tracing::info!("Engine reconfigured"),
            Err(e) => {
                tracing::error!(error = %e, "Reconfiguration rejected, keeping previous settings");
                continue;
            }
        }
        if config.listener.bind_address != current.listener.bind_address
            || config.upstream.origin != current.upstream.origin
        {
            tracing::warn!("Listener and upstream changes take effect after a restart");
        }
        current = config;
    }
}

/// Catch-all handler: every request is offered to the engine first.
async fn replay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(&request).to_string();
    let settings = state.engine.settings();

    let (parts, body) = request.into_parts();
    let descriptor = RequestDescriptor::from_parts(&parts, settings.replay_origin());

    match state.engine.reroute_with(&settings, &descriptor).await {
        Disposition::Respond(response) => response,
        Disposition::Bypass { reason } => {
            tracing::debug!(request_id = %request_id, url = %descriptor.url, reason = %reason, "Forwarding bypassed request");
            forward(&state, &settings, descriptor, body, &request_id).await
        }
    }
}

/// Default request handling: send the request on as it came in.
async fn forward(
    state: &AppState,
    settings: &Settings,
    descriptor: RequestDescriptor,
    body: Body,
    request_id: &str,
) -> Response {
    let started = Instant::now();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) if bytes.is_empty() => None,
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let mut headers = descriptor.headers;
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    let outbound = OutboundRequest {
        method: descriptor.method,
        url: descriptor.url,
        headers,
        body,
    };

    let result = state.engine.fetcher().fetch(outbound, settings.replay_origin()).await;
    metrics::record_disposition("forward", started);
    match result {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
