//! Compiled engine settings.
//!
//! # Responsibilities
//! - Compile an [`EngineConfig`] into an immutable [`Settings`] value
//! - Keep the URI-M matcher derived from, and consistent with, the template
//! - Resolve banner locations against the replay origin
//!
//! # Design Decisions
//! - Settings are never mutated; reconfiguration compiles and swaps a new value
//! - Every invalid setting is reported as `EngineError::Config`

use axum::http::{HeaderName, HeaderValue};
use url::{Origin, Url};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::memento::UrimPattern;

/// Banner settings resolved for request matching and rendering.
#[derive(Debug, Clone)]
pub struct BannerSettings {
    pub enabled: bool,
    pub element_location: String,
    pub element_name: String,
    pub logo_location: String,
    /// Home link as configured, used in the banner markup.
    pub home_href: String,
    /// Home link resolved against the replay origin, used for request matching.
    pub home_url: Option<String>,
}

/// Immutable engine settings shared by every in-flight request.
#[derive(Debug, Clone)]
pub struct Settings {
    id: String,
    provenance_name: HeaderName,
    provenance_value: HeaderValue,
    pattern: UrimPattern,
    replay_origin: Origin,
    banner: BannerSettings,
    debug: bool,
    max_rewrite_bytes: usize,
}

impl Settings {
    /// Compile engine configuration into settings.
    pub fn compile(config: &EngineConfig) -> Result<Self, EngineError> {
        let pattern = UrimPattern::new(&config.urim_template)?;

        let origin_url = match &config.replay_origin {
            Some(origin) => Url::parse(origin)
                .map_err(|e| EngineError::config(format!("replay origin `{origin}`: {e}")))?,
            None => template_url(&pattern)?,
        };
        let replay_origin = origin_url.origin();
        if !replay_origin.is_tuple() {
            return Err(EngineError::config(format!(
                "replay origin of `{origin_url}` is opaque"
            )));
        }

        let provenance_name = HeaderName::from_bytes(config.provenance_header.as_bytes())
            .map_err(|_| {
                EngineError::config(format!(
                    "`{}` is not a valid header name",
                    config.provenance_header
                ))
            })?;
        let provenance_value = HeaderValue::from_str(&config.id).map_err(|_| {
            EngineError::config(format!("engine id `{}` is not a valid header value", config.id))
        })?;

        let banner = &config.banner;
        if banner.enabled {
            if banner.element_location.is_empty() {
                return Err(EngineError::config("banner element location must not be empty"));
            }
            if !banner.element_name.contains('-') {
                return Err(EngineError::config(format!(
                    "banner element name `{}` must contain a hyphen",
                    banner.element_name
                )));
            }
        }
        let home_url = if banner.home_href.is_empty() {
            None
        } else {
            origin_url.join(&banner.home_href).ok().map(String::from)
        };

        Ok(Self {
            id: config.id.clone(),
            provenance_name,
            provenance_value,
            pattern,
            replay_origin,
            banner: BannerSettings {
                enabled: banner.enabled,
                element_location: banner.element_location.clone(),
                element_name: banner.element_name.clone(),
                logo_location: banner.logo_location.clone(),
                home_href: banner.home_href.clone(),
                home_url,
            },
            debug: config.debug,
            max_rewrite_bytes: config.max_rewrite_bytes,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Header name and value announcing the engine to the archive.
    pub fn provenance(&self) -> (&HeaderName, &HeaderValue) {
        (&self.provenance_name, &self.provenance_value)
    }

    pub fn pattern(&self) -> &UrimPattern {
        &self.pattern
    }

    pub fn replay_origin(&self) -> &Origin {
        &self.replay_origin
    }

    pub fn banner(&self) -> &BannerSettings {
        &self.banner
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn max_rewrite_bytes(&self) -> usize {
        self.max_rewrite_bytes
    }
}

/// The template with sample values substituted, parsed as a URL.
fn template_url(pattern: &UrimPattern) -> Result<Url, EngineError> {
    let sample = pattern.synthesize("20000101000000", "http://example.com/");
    Url::parse(&sample).map_err(|e| {
        EngineError::config(format!(
            "cannot derive a replay origin from template `{}`: {e}",
            pattern.template()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(template: &str) -> EngineConfig {
        EngineConfig {
            urim_template: template.to_string(),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_replay_origin_defaults_to_template_origin() {
        let settings = Settings::compile(&config("https://archive.example/memento/<datetime>/<urir>")).unwrap();
        assert_eq!(settings.replay_origin().ascii_serialization(), "https://archive.example");
    }

    #[test]
    fn test_explicit_replay_origin() {
        let mut config = config("https://archive.example/memento/<datetime>/<urir>");
        config.replay_origin = Some("http://localhost:3000".into());
        let settings = Settings::compile(&config).unwrap();
        assert_eq!(settings.replay_origin().ascii_serialization(), "http://localhost:3000");
    }

    #[test]
    fn test_relative_template_is_rejected() {
        let err = Settings::compile(&config("/memento/<datetime>/<urir>")).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_home_href_is_resolved() {
        let mut config = config("https://archive.example/memento/<datetime>/<urir>");
        config.banner.home_href = "/".into();
        let settings = Settings::compile(&config).unwrap();
        assert_eq!(settings.banner().home_url.as_deref(), Some("https://archive.example/"));
    }

    #[test]
    fn test_invalid_provenance_header() {
        let mut config = config("https://archive.example/memento/<datetime>/<urir>");
        config.provenance_header = "X Service Worker".into();
        assert!(matches!(Settings::compile(&config), Err(EngineError::Config(_))));
    }
}
