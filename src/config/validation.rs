//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the URI-M template and engine settings compile
//! - Check that addresses and origins parse
//! - Reject configs whose memento fetches would land back on the listener
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ReplayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::{Host, Origin, Url};

use crate::config::schema::ReplayConfig;
use crate::engine::Settings;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ReplayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let settings = match Settings::compile(&config.engine) {
        Ok(settings) => Some(settings),
        Err(e) => {
            errors.push(ValidationError::new("engine", e.to_string()));
            None
        }
    };

    let bind = config.listener.bind_address.parse::<SocketAddr>().ok();
    if bind.is_none() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }

    let upstream = match &config.upstream.origin {
        Some(origin) => match Url::parse(origin) {
            Ok(url) if url.has_host() => Some(url.origin()),
            _ => {
                errors.push(ValidationError::new(
                    "upstream.origin",
                    format!("`{origin}` is not an absolute URL"),
                ));
                None
            }
        },
        None => settings.as_ref().map(|s| s.replay_origin().clone()),
    };

    // Mementos are fetched from the upstream origin, or from the replay origin
    // itself when no upstream is configured.
    if let (Some(target), Some(bind)) = (&upstream, bind) {
        if reaches_listener(target, bind) {
            let message = match &config.upstream.origin {
                Some(origin) => format!("`{origin}` is this proxy's own listener"),
                None => format!(
                    "must be set: the replay origin `{}` is served by this listener",
                    target.ascii_serialization()
                ),
            };
            errors.push(ValidationError::new("upstream.origin", message));
        }
    }

    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.request_timeout_secs", "must be positive"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "admin.bind_address",
                format!("`{}` is not a socket address", config.admin.bind_address),
            ));
        }
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whether requests to `origin` would be accepted by a listener bound to `bind`.
fn reaches_listener(origin: &Origin, bind: SocketAddr) -> bool {
    let Origin::Tuple(_, host, port) = origin else {
        return false;
    };
    if *port != bind.port() {
        return false;
    }
    let local = bind.ip().is_unspecified() || bind.ip().is_loopback();
    match host {
        Host::Domain(domain) => local && domain.eq_ignore_ascii_case("localhost"),
        Host::Ipv4(ip) => addresses_listener(IpAddr::V4(*ip), bind.ip()),
        Host::Ipv6(ip) => addresses_listener(IpAddr::V6(*ip), bind.ip()),
    }
}

fn addresses_listener(host: IpAddr, bind: IpAddr) -> bool {
    host == bind
        || (bind.is_unspecified() && (host.is_loopback() || host.is_unspecified()))
        || (bind.is_loopback() && host.is_loopback())
}
