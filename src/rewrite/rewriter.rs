//! HTML rewriting strategies.

use std::sync::Arc;

use axum::http::HeaderMap;

use super::banner::{BannerContext, BannerRenderer, ElementBanner};
use super::html::{inject_markup, rewrite_absolute_references};
use super::links::relations_from_headers;
use crate::engine::{NavigationMode, Settings};
use crate::memento::datetime::http_date;

/// What a rewriter knows about the response it is rewriting.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub settings: &'a Settings,
    /// Capture datetime of the response's own URI-M.
    pub datetime: &'a str,
    /// URI-R of the response's own URI-M.
    pub urir: &'a str,
    /// Response headers.
    pub headers: &'a HeaderMap,
    /// Navigation mode of the original request.
    pub mode: NavigationMode,
}

impl RewriteContext<'_> {
    /// A banner belongs on top-level page loads when the banner is enabled.
    pub fn wants_banner(&self) -> bool {
        self.settings.banner().enabled && self.mode.is_navigate()
    }

    /// `Memento-Datetime` of the response, else the formatted capture datetime.
    pub fn memento_datetime(&self) -> String {
        self.headers
            .get("memento-datetime")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| http_date(self.datetime))
            .unwrap_or_default()
    }
}

/// Rewrites a fully buffered HTML body.
pub trait HtmlRewriter: Send + Sync {
    fn rewrite(&self, body: &str, context: &RewriteContext<'_>) -> String;
}

/// Rewrites absolute links and iframes into mementos and injects the banner.
#[derive(Clone)]
pub struct ArchivalRewriter {
    banner: Arc<dyn BannerRenderer>,
}

impl ArchivalRewriter {
    pub fn new(banner: Arc<dyn BannerRenderer>) -> Self {
        Self { banner }
    }
}

impl Default for ArchivalRewriter {
    fn default() -> Self {
        Self::new(Arc::new(ElementBanner))
    }
}

impl HtmlRewriter for ArchivalRewriter {
    fn rewrite(&self, body: &str, context: &RewriteContext<'_>) -> String {
        let body = rewrite_absolute_references(body, context.settings.pattern(), context.datetime);
        if !context.wants_banner() {
            return body.into_owned();
        }

        let relations = relations_from_headers(context.headers);
        let memento_datetime = context.memento_datetime();
        let markup = self.banner.render(&BannerContext {
            banner: context.settings.banner(),
            urir: context.urir,
            memento_datetime: &memento_datetime,
            relations: &relations,
        });
        inject_markup(&body, &markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    use crate::config::EngineConfig;

    const DATETIME: &str = "20170206002337";

    fn settings(banner: bool) -> Settings {
        let mut config = EngineConfig {
            urim_template: "https://archive.example/memento/<datetime>/<urir>".into(),
            ..EngineConfig::default()
        };
        config.banner.enabled = banner;
        Settings::compile(&config).unwrap()
    }

    fn context<'a>(settings: &'a Settings, headers: &'a HeaderMap, mode: NavigationMode) -> RewriteContext<'a> {
        RewriteContext {
            settings,
            datetime: DATETIME,
            urir: "https://example.com/",
            headers,
            mode,
        }
    }

    #[test]
    fn test_memento_datetime_prefers_header() {
        let settings = settings(true);
        let mut headers = HeaderMap::new();
        let ctx = context(&settings, &headers, NavigationMode::Navigate);
        assert_eq!(ctx.memento_datetime(), "Mon, 06 Feb 2017 00:23:37 GMT");

        headers.insert("memento-datetime", HeaderValue::from_static("Sun, 05 Feb 2017 10:00:00 GMT"));
        let ctx = context(&settings, &headers, NavigationMode::Navigate);
        assert_eq!(ctx.memento_datetime(), "Sun, 05 Feb 2017 10:00:00 GMT");
    }

    #[test]
    fn test_banner_carries_link_relations() {
        let settings = settings(true);
        let mut headers = HeaderMap::new();
        headers.insert(
            header::LINK,
            HeaderValue::from_static(
                r#"<https://archive.example/memento/20160101000000/https://example.com/>; rel="prev memento"; datetime="Fri, 01 Jan 2016 00:00:00 GMT""#,
            ),
        );

        let body = ArchivalRewriter::default().rewrite(
            "<html><body><a href=\"https://other.com/\">o</a></body></html>",
            &context(&settings, &headers, NavigationMode::Navigate),
        );
        assert!(body.contains(
            r#"<a href="https://archive.example/memento/20170206002337/https://other.com/">"#
        ));
        assert!(body.contains(
            r#"prev-urim="https://archive.example/memento/20160101000000/https://example.com/""#
        ));
        assert!(body.contains(r#"prev-datetime="Fri, 01 Jan 2016 00:00:00 GMT""#));
        assert_eq!(body.matches("<reconstructive-banner").count(), 1);
        assert!(body.ends_with("</reconstructive-banner>\n</body></html>"));
    }

    #[test]
    fn test_no_banner_when_disabled() {
        let settings = settings(false);
        let headers = HeaderMap::new();
        let body = ArchivalRewriter::default().rewrite(
            "<html><body></body></html>",
            &context(&settings, &headers, NavigationMode::Navigate),
        );
        assert_eq!(body, "<html><body></body></html>");
    }

    struct Marker;

    impl BannerRenderer for Marker {
        fn render(&self, context: &BannerContext<'_>) -> String {
            format!("<!-- {} -->", context.urir)
        }
    }

    #[test]
    fn test_custom_banner_renderer() {
        let settings = settings(true);
        let headers = HeaderMap::new();
        let body = ArchivalRewriter::new(Arc::new(Marker)).rewrite(
            "<body></body>",
            &context(&settings, &headers, NavigationMode::Navigate),
        );
        assert_eq!(body, "<body><!-- https://example.com/ --></body>");
    }
}
