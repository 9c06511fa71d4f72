//! Response rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! 2xx HTML response (buffered)
//!     → rewriter.rs (strategy entry point)
//!     → html.rs (absolute <a>/<iframe> references → URI-Ms)
//!     → links.rs (Link header → first/last/prev/next)
//!     → banner.rs (banner markup) → html.rs (inject before </body>)
//! ```

pub mod banner;
pub mod html;
pub mod links;
pub mod rewriter;

pub use banner::{BannerContext, BannerRenderer, ElementBanner};
pub use links::{parse_link_header, Relation, RelationMap};
pub use rewriter::{ArchivalRewriter, HtmlRewriter, RewriteContext};
