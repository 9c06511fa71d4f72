//! Ordered, named exclusion predicates.
//!
//! # Responsibilities
//! - Hold exclusions in registration order
//! - Report the first exclusion matching a request
//! - Let callers add, replace and remove exclusions by name
//!
//! # Design Decisions
//! - Predicates are independent and side-effect free
//! - Evaluation short-circuits on the first match
//! - Closures and trait objects are both accepted

use std::fmt;

use crate::engine::{RequestDescriptor, Settings};

/// A reason to leave a request alone.
pub trait Exclusion: Send + Sync {
    /// Returns true if the request must bypass the engine.
    fn matches(&self, request: &RequestDescriptor, settings: &Settings) -> bool;
}

impl<F> Exclusion for F
where
    F: Fn(&RequestDescriptor, &Settings) -> bool + Send + Sync,
{
    fn matches(&self, request: &RequestDescriptor, settings: &Settings) -> bool {
        self(request, settings)
    }
}

/// Named exclusions evaluated in order.
pub struct ExclusionFilter {
    entries: Vec<(String, Box<dyn Exclusion>)>,
}

impl ExclusionFilter {
    /// A filter with no exclusions at all.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register an exclusion. An existing exclusion with the same name is
    /// replaced in place and keeps its position.
    pub fn push(&mut self, name: impl Into<String>, exclusion: impl Exclusion + 'static) -> &mut Self {
        let name = name.into();
        let exclusion: Box<dyn Exclusion> = Box::new(exclusion);
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = exclusion,
            None => self.entries.push((name, exclusion)),
        }
        self
    }

    /// Remove an exclusion by name. Returns whether it was registered.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| existing != name);
        self.entries.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == name)
    }

    /// Exclusion names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Name of the first exclusion matching the request, if any.
    pub fn first_match(&self, request: &RequestDescriptor, settings: &Settings) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, exclusion)| exclusion.matches(request, settings))
            .map(|(name, _)| name.as_str())
    }
}

impl Default for ExclusionFilter {
    /// The standard exclusions: `not_get`, `banner_asset`, `home_page`, `local_resource`.
    fn default() -> Self {
        use super::predicates::{BannerAsset, HomePage, LocalResource, NotGet};

        let mut filter = Self::empty();
        filter
            .push(NotGet::NAME, NotGet)
            .push(BannerAsset::NAME, BannerAsset)
            .push(HomePage::NAME, HomePage)
            .push(LocalResource::NAME, LocalResource);
        filter
    }
}

impl fmt::Debug for ExclusionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::config::EngineConfig;

    fn settings() -> Settings {
        Settings::compile(&EngineConfig {
            urim_template: "https://archive.example/memento/<datetime>/<urir>".into(),
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_default_order() {
        let filter = ExclusionFilter::default();
        assert_eq!(
            filter.names().collect::<Vec<_>>(),
            vec!["not_get", "banner_asset", "home_page", "local_resource"]
        );
    }

    #[test]
    fn test_short_circuits_on_first_match() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();

        let mut filter = ExclusionFilter::empty();
        filter
            .push("always", |_: &RequestDescriptor, _: &Settings| true)
            .push("counted", move |_: &RequestDescriptor, _: &Settings| {
                counted.fetch_add(1, Ordering::SeqCst);
                true
            });

        let request = RequestDescriptor::new(Method::GET, "https://archive.example/");
        assert_eq!(filter.first_match(&request, &settings()), Some("always"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut filter = ExclusionFilter::default();
        filter.push("not_get", |_: &RequestDescriptor, _: &Settings| false);
        assert_eq!(filter.names().next(), Some("not_get"));

        let post = RequestDescriptor::new(
            Method::POST,
            "https://archive.example/memento/20170206002337/https://example.com/",
        );
        assert_eq!(filter.first_match(&post, &settings()), None);

        assert!(filter.remove("local_resource"));
        assert!(!filter.remove("local_resource"));
        assert!(!filter.contains("local_resource"));
    }
}
