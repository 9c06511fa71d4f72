//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → engine (descriptor → disposition)
//!     → Respond: engine response / Bypass: forwarded as is
//!     → headers.rs (hop-by-hop stripping both ways)
//! ```

pub mod headers;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
