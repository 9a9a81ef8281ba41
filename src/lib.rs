//! HTTP request routing with content negotiation.
//!
//! Requests are matched by path pattern, then method, then the request
//! `Content-Type` against each route's `consumes`, then the `Accept` header
//! against each route's `produces`.

pub mod config;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod media;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use media::{AcceptHeader, MediaType};
pub use routing::{handler_fn, Handler, RouteDescriptor, RouteInfo, RouteTable};
