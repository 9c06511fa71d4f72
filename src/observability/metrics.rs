//! Metrics collection and exposition.
//!
//! # Metrics
//! - `replay_requests_total` (counter): intercepted requests by disposition
//! - `replay_request_duration_seconds` (histogram): pipeline latency by disposition
//! - `replay_upstream_status_total` (counter): archive responses by status code
//! - `replay_rewrites_total` (counter): rewritten HTML pages, labelled by banner
//!
//! Dispositions: `bypass`, `redirect`, `fetched`, `unavailable`, plus `forward`
//! for bypassed requests the proxy forwarded.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one pipeline outcome and its latency.
pub fn record_disposition(disposition: &'static str, started: Instant) {
    metrics::counter!("replay_requests_total", "disposition" => disposition).increment(1);
    metrics::histogram!("replay_request_duration_seconds", "disposition" => disposition)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_upstream_status(status: u16) {
    metrics::counter!("replay_upstream_status_total", "status" => status.to_string()).increment(1);
}

pub fn record_rewrite(banner: bool) {
    let banner = if banner { "true" } else { "false" };
    metrics::counter!("replay_rewrites_total", "banner" => banner).increment(1);
}
