//! Media type model.
//!
//! # Data Flow
//! ```text
//! Route declaration ("text/html; charset=utf-8")
//!     → media_type.rs (parse once at startup)
//!
//! Request headers:
//!     Content-Type → media_type.rs → consumes matching
//!     Accept       → accept.rs (entries + q) → produces negotiation
//! ```
//!
//! # Design Decisions
//! - Matching rules live on `MediaType`, one method per direction
//! - Parsing is strict; callers decide how to treat malformed headers

pub mod accept;
pub mod media_type;

pub use accept::{AcceptEntry, AcceptError, AcceptHeader, Quality};
pub use media_type::{MediaType, MediaTypeError, Specificity};
