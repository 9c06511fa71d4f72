//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → stop accepting → drain in-flight requests → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! Configuration reloads come from the file watcher, not from signals.

pub mod shutdown;
pub mod signals;

pub use shutdown::{signalled, Shutdown};
pub use signals::wait_for_signal;
