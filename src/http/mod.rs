//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID; helpers for params and matched route)
//!     → routing::RouteTable::dispatch
//!     → response.rs (Vary, cache headers, HEAD bodies)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{
    matched_route, path_param, query_param, query_param_as_int, request_id, X_REQUEST_ID,
};
pub use server::HttpServer;
