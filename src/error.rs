//! Engine error kinds.
//!
//! Only `Config` is fatal, and only at configuration time: a rejected
//! reconfiguration leaves the previous settings in place. Every other kind is
//! recovered inside the pipeline and turned into a response (or a bypass).

use thiserror::Error;

/// Errors produced by the replay engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The URI-M template or another engine setting is unusable.
    #[error("invalid engine configuration: {0}")]
    Config(String),

    /// The URL does not match the current URI-M template.
    #[error("not a memento URI: {0}")]
    NotAMemento(String),

    /// The outbound fetch failed before a response existed.
    #[error("network failure fetching {url}: {reason}")]
    Network { url: String, reason: String },

    /// One segment of a `Link` header could not be used.
    #[error("malformed Link header segment: {0}")]
    MalformedLinkHeader(String),
}

impl EngineError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        EngineError::Config(reason.into())
    }
}
