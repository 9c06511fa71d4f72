//! The standard exclusions.

use axum::http::Method;

use super::filter::Exclusion;
use crate::engine::{RequestDescriptor, Settings};

/// Only `GET` requests are rerouted.
#[derive(Debug, Clone, Copy)]
pub struct NotGet;

impl NotGet {
    pub const NAME: &'static str = "not_get";
}

impl Exclusion for NotGet {
    fn matches(&self, request: &RequestDescriptor, _: &Settings) -> bool {
        request.method != Method::GET
    }
}

/// The banner's own script and logo are served as they are.
#[derive(Debug, Clone, Copy)]
pub struct BannerAsset;

impl BannerAsset {
    pub const NAME: &'static str = "banner_asset";
}

impl Exclusion for BannerAsset {
    fn matches(&self, request: &RequestDescriptor, settings: &Settings) -> bool {
        let banner = settings.banner();
        if !banner.enabled {
            return false;
        }
        let url = request.url.as_str();
        (!banner.element_location.is_empty() && url.ends_with(&banner.element_location))
            || (!banner.logo_location.is_empty() && url.ends_with(&banner.logo_location))
    }
}

/// The replay home page linked from the banner logo.
#[derive(Debug, Clone, Copy)]
pub struct HomePage;

impl HomePage {
    pub const NAME: &'static str = "home_page";
}

impl Exclusion for HomePage {
    fn matches(&self, request: &RequestDescriptor, settings: &Settings) -> bool {
        let banner = settings.banner();
        banner.enabled && banner.home_url.as_deref() == Some(request.url.as_str())
    }
}

/// Traffic with no memento on either end has nothing to do with replay.
#[derive(Debug, Clone, Copy)]
pub struct LocalResource;

impl LocalResource {
    pub const NAME: &'static str = "local_resource";
}

impl Exclusion for LocalResource {
    fn matches(&self, request: &RequestDescriptor, settings: &Settings) -> bool {
        let pattern = settings.pattern();
        !(pattern.is_match(&request.url) || pattern.is_match(&request.referrer))
    }
}
