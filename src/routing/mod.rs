//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, method, Content-Type, Accept)
//!     → router.rs   (first path pattern that matches → PathParams)
//!     → method.rs   (declared method, auto HEAD/OPTIONS, or 405)
//!     → consumes.rs (Content-Type → most specific consumes, or 415)
//!     → produces.rs (Accept → best produces, or 406)
//!     → Handler, then Vary/Content-Type/cache headers
//!
//! Route Compilation (at startup):
//!     RouteDescriptor[]
//!     → Parse patterns and media types
//!     → Group by path, method, consumes, produces
//!     → Reject duplicates and ambiguous consumes
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same request always selects the same route
//! - First registered path wins; specificity decides media types

pub mod consumes;
pub mod error;
pub mod method;
pub mod pattern;
pub mod produces;
pub mod route;
pub mod router;

pub use error::{Rejection, RouteError};
pub use pattern::{PathParams, PathPattern, PatternError};
pub use route::{handler_fn, Handler, HandlerError, RouteDescriptor, RouteInfo};
pub use router::{Resolution, RouteTable, RouteTableBuilder};
