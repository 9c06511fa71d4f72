//! Memento identifiers.
//!
//! # Data Flow
//! ```text
//! URI-M template (config)
//!     → template.rs (compile matcher, extract / synthesize)
//!
//! request URL + referrer URI-M
//!     → template.rs (datetime + referring URI-R)
//!     → resolve.rs (URI-R of the request)
//!     → template.rs (synthesized URI-M)
//! ```

pub mod datetime;
pub mod resolve;
pub mod template;

pub use resolve::resolve_urir;
pub use template::{Memento, UrimPattern, DATETIME_PLACEHOLDER, URIR_PLACEHOLDER};
