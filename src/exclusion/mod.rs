//! Request exclusion subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor + Settings
//!     → filter.rs (ordered evaluation, first match wins)
//!     → predicates.rs (not_get, banner_asset, home_page, local_resource)
//!     → Some(name): bypass the engine / None: reroute
//! ```

pub mod filter;
pub mod predicates;

pub use filter::{Exclusion, ExclusionFilter};
pub use predicates::{BannerAsset, HomePage, LocalResource, NotGet};
