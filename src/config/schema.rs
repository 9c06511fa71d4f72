//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the replay proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the replay proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReplayConfig {
    /// Listener configuration (bind address, limits).
    pub listener: ListenerConfig,

    /// Where outbound fetches go.
    pub upstream: UpstreamConfig,

    /// Request rerouting and rewriting.
    pub engine: EngineConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin endpoint settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Upstream (archive) connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin the archive is reachable at, when it differs from the replay origin
    /// (e.g., "http://127.0.0.1:9000").
    pub origin: Option<String>,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total time allowed for one upstream exchange in seconds.
    pub request_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: None,
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
        }
    }
}

/// Engine configuration.
///
/// Compiled into [`crate::engine::Settings`]; a new value replaces the running
/// settings wholesale.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Identifier sent upstream in the provenance header.
    pub id: String,

    /// Name of the provenance header.
    pub provenance_header: String,

    /// URI-M template with one `<datetime>` and one `<urir>` placeholder.
    pub urim_template: String,

    /// Public origin of the replay. Defaults to the origin of `urim_template`.
    pub replay_origin: Option<String>,

    /// Archival banner settings.
    pub banner: BannerConfig,

    /// Log per-request decisions at INFO instead of DEBUG.
    pub debug: bool,

    /// Largest HTML body buffered for rewriting, in bytes.
    pub max_rewrite_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            id: concat!(env!("CARGO_PKG_NAME"), ":", env!("CARGO_PKG_VERSION")).to_string(),
            provenance_header: "X-ServiceWorker".to_string(),
            urim_template: "http://localhost:8080/memento/<datetime>/<urir>".to_string(),
            replay_origin: None,
            banner: BannerConfig::default(),
            debug: false,
            max_rewrite_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Archival banner configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BannerConfig {
    /// Inject the banner into navigational HTML pages.
    pub enabled: bool,

    /// URL or absolute path of the script defining the banner element.
    pub element_location: String,

    /// Custom element name the banner script registers.
    pub element_name: String,

    /// URL or absolute path of the banner logo. Empty selects the built-in logo.
    pub logo_location: String,

    /// Link target of the banner logo.
    pub home_href: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            element_location: "/banner.js".to_string(),
            element_name: "reconstructive-banner".to_string(),
            logo_location: String::new(),
            home_href: "/".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin endpoint.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin endpoint bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ReplayConfig = toml::from_str(
            r#"
            [engine]
            urim_template = "https://archive.example/memento/<datetime>/<urir>"

            [engine.banner]
            enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.urim_template, "https://archive.example/memento/<datetime>/<urir>");
        assert!(config.engine.banner.enabled);
        assert_eq!(config.engine.banner.home_href, "/");
        assert_eq!(config.engine.provenance_header, "X-ServiceWorker");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
