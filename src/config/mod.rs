//! Configuration: TOML file to validated `ReplayConfig`.
//!
//! ```text
//! replay.toml
//!     → loader.rs (read, deserialize, validate)
//!     → validation.rs (engine settings compile, addresses and origins parse)
//!     → ReplayConfig
//!     → engine Settings compiled from ReplayConfig.engine
//!
//! file saved:
//!     watcher.rs (directory event for the file, content changed)
//!     → loader.rs → mpsc channel → server → Engine::reconfigure
//! ```
//!
//! Every field has a default, so an empty file is a valid configuration. A
//! configuration that fails validation never reaches the engine.

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, BannerConfig, EngineConfig, ListenerConfig, ObservabilityConfig, ReplayConfig,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
