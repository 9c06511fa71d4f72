//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! engine, http, config:
//!     → logging.rs (structured log events, per-request decisions)
//!     → metrics.rs (dispositions, upstream statuses, rewrites)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the HTTP layer into every span
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
