//! Archival banner markup.
//!
//! The banner itself is a client-side custom element; this module only emits
//! the script tag and the element with its attribute contract.

use super::html::escape_html;
use super::links::RelationMap;
use crate::engine::BannerSettings;

/// Everything a banner renderer may show.
#[derive(Debug, Clone)]
pub struct BannerContext<'a> {
    pub banner: &'a BannerSettings,
    pub urir: &'a str,
    /// HTTP-date of the capture, empty when unknown.
    pub memento_datetime: &'a str,
    pub relations: &'a RelationMap,
}

/// Produces the markup injected into navigational pages.
pub trait BannerRenderer: Send + Sync {
    fn render(&self, context: &BannerContext<'_>) -> String;
}

/// Renders `<script>` plus the configured custom element.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementBanner;

impl BannerRenderer for ElementBanner {
    fn render(&self, context: &BannerContext<'_>) -> String {
        let banner = context.banner;
        let mut attributes = vec![
            ("logo-src", banner.logo_location.as_str()),
            ("home-href", banner.home_href.as_str()),
            ("urir", context.urir),
            ("memento-datetime", context.memento_datetime),
        ];
        for (rel, urim_attr, datetime_attr) in [
            ("first", "first-urim", "first-datetime"),
            ("last", "last-urim", "last-datetime"),
            ("prev", "prev-urim", "prev-datetime"),
            ("next", "next-urim", "next-datetime"),
        ] {
            let relation = context.relations.get(rel);
            attributes.push((urim_attr, relation.map_or("", |r| r.href.as_str())));
            attributes.push((
                datetime_attr,
                relation.and_then(|r| r.datetime.as_deref()).unwrap_or(""),
            ));
        }

        let mut markup = format!(
            "\n<script src=\"{}\"></script>\n<{}",
            escape_html(&banner.element_location),
            banner.element_name
        );
        for (name, value) in attributes {
            markup.push_str(&format!("\n  {}=\"{}\"", name, escape_html(value)));
        }
        markup.push_str(&format!("></{}>\n", banner.element_name));
        markup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::links::parse_link_header;

    fn banner() -> BannerSettings {
        BannerSettings {
            enabled: true,
            element_location: "/banner.js".into(),
            element_name: "reconstructive-banner".into(),
            logo_location: String::new(),
            home_href: "/".into(),
            home_url: Some("https://archive.example/".into()),
        }
    }

    #[test]
    fn test_renders_attribute_contract() {
        let banner = banner();
        let relations = parse_link_header(
            r#"<https://archive.example/memento/20170101000000/https://example.com/>; rel="first memento"; datetime="Sun, 01 Jan 2017 00:00:00 GMT""#,
        );
        let markup = ElementBanner.render(&BannerContext {
            banner: &banner,
            urir: "https://example.com/?a=1&b=2",
            memento_datetime: "Mon, 06 Feb 2017 00:23:37 GMT",
            relations: &relations,
        });

        assert!(markup.starts_with("\n<script src=\"/banner.js\"></script>\n<reconstructive-banner"));
        assert!(markup.ends_with("></reconstructive-banner>\n"));
        assert!(markup.contains(r#"urir="https://example.com/?a=1&amp;b=2""#));
        assert!(markup.contains(r#"memento-datetime="Mon, 06 Feb 2017 00:23:37 GMT""#));
        assert!(markup.contains(
            r#"first-urim="https://archive.example/memento/20170101000000/https://example.com/""#
        ));
        assert!(markup.contains(r#"first-datetime="Sun, 01 Jan 2017 00:00:00 GMT""#));
        assert!(markup.contains(r#"last-urim="""#));
        assert!(markup.contains(r#"next-datetime="""#));
        assert!(markup.contains(r#"logo-src="""#));
        assert!(markup.contains(r#"home-href="/""#));
    }
}
