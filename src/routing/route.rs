//! Route declarations and the handler contract.
//!
//! # Responsibilities
//! - Define the `Handler` trait invoked for a matched route
//! - Define `RouteDescriptor`, the declarative registration unit
//! - Define `RouteInfo`, the matched route exposed to handlers
//!
//! # Design Decisions
//! - Handlers are async and object-safe (`Arc<dyn Handler>`)
//! - Descriptors keep raw strings; parsing happens in one place at build time
//! - `consumes`/`produces` default to `*/*`

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::media::MediaType;

/// Error returned by a failing handler; mapped to `500` by the HTTP layer.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// An endpoint invoked once routing has selected it.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Result<Response, HandlerError>>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    fn call(&self, request: Request<Body>) -> BoxFuture<'static, Result<Response, HandlerError>> {
        Box::pin(self(request))
    }
}

/// Wrap an async function as a shareable handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn Handler>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    Arc::new(f)
}

/// One routable endpoint: `(method, path, consumes, produces, handler)`.
#[derive(Clone)]
pub struct RouteDescriptor {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) consumes: String,
    pub(crate) produces: String,
    pub(crate) disable_cache: bool,
    pub(crate) handler: Arc<dyn Handler>,
}

impl RouteDescriptor {
    /// Declare a route with `*/*` for both media types.
    pub fn new(method: Method, path: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        Self {
            method,
            path: path.into(),
            consumes: "*/*".to_string(),
            produces: "*/*".to_string(),
            disable_cache: false,
            handler,
        }
    }

    /// The request media type accepted by this route.
    pub fn consumes(mut self, media_type: impl Into<String>) -> Self {
        self.consumes = media_type.into();
        self
    }

    /// The response media type emitted by this route.
    pub fn produces(mut self, media_type: impl Into<String>) -> Self {
        self.produces = media_type.into();
        self
    }

    /// Forbid clients from caching responses of this route.
    pub fn disable_cache(mut self) -> Self {
        self.disable_cache = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("consumes", &self.consumes)
            .field("produces", &self.produces)
            .field("disable_cache", &self.disable_cache)
            .finish_non_exhaustive()
    }
}

/// The route that matched a request.
///
/// Inserted into the request extensions so a handler bound to several routes
/// can tell which one was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: Method,
    pub path: String,
    pub consumes: MediaType,
    pub produces: MediaType,
}

/// A compiled route: parsed media types plus the handler.
pub struct CompiledRoute {
    pub(crate) info: RouteInfo,
    pub(crate) disable_cache: bool,
    pub(crate) handler: Arc<dyn Handler>,
}

impl CompiledRoute {
    pub fn info(&self) -> &RouteInfo {
        &self.info
    }
}

impl fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("info", &self.info)
            .field("disable_cache", &self.disable_cache)
            .finish_non_exhaustive()
    }
}
