//! Archival request reconstruction engine.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor
//!     → exclusion filter (bypass?)
//!     → URI-M already?  yes → fetch.rs (provenance header, manual redirects)
//!                              → 2xx HTML → rewrite strategy
//!                              → network failure → 503
//!                       no  → reconstruct from referrer → local 302
//! ```
//!
//! # Design Decisions
//! - Settings live behind an `ArcSwap` and are replaced, never edited
//! - Strategies (exclusions, rewriter, fetcher) are fixed at setup time

/// Log a per-request decision at INFO when the engine runs in debug mode,
/// DEBUG otherwise.
macro_rules! decision {
    ($settings:expr, $($arg:tt)+) => {
        if $settings.debug() {
            ::tracing::info!($($arg)+)
        } else {
            ::tracing::debug!($($arg)+)
        }
    };
}

pub mod descriptor;
pub mod fetch;
pub mod pipeline;
pub mod responses;
pub mod settings;

pub use descriptor::{NavigationMode, RequestDescriptor};
pub use fetch::{Fetcher, HttpFetcher, OutboundRequest};
pub use pipeline::{Disposition, Engine};
pub use settings::{BannerSettings, Settings};
