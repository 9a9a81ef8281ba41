//! Endpoint implementations.
//!
//! # Responsibilities
//! - `fixed.rs`: a handler returning a constant body
//! - `status.rs`: `robots.txt`, health and status endpoints
//! - `registry.rs`: name → handler table for configured routes
//!
//! Handlers never set `Content-Type` for negotiated types; the router
//! derives it from the matched route's `produces`.

pub mod fixed;
pub mod registry;
pub mod status;

pub use fixed::FixedResponse;
pub use registry::HandlerRegistry;
