//! Archival replay proxy.
//!
//! Intercepts requests made by pages replayed from a web archive, keeps them
//! inside the archive by rerouting them to mementos, and rewrites archived
//! HTML so navigation stays in the same point in time.

pub mod admin;
pub mod config;
pub mod engine;
pub mod error;
pub mod exclusion;
pub mod http;
pub mod lifecycle;
pub mod memento;
pub mod observability;
pub mod rewrite;

pub use config::ReplayConfig;
pub use engine::{Disposition, Engine, RequestDescriptor};
pub use error::EngineError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
