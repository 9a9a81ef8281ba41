//! Route table assembly and request dispatch.
//!
//! # Responsibilities
//! - Compile `RouteDescriptor`s into the path → method → consumes →
//!   produces tree
//! - Reject duplicate and ambiguous registrations at build time
//! - Run the dispatch pipeline for each request
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, no locks)
//! - Paths are scanned in registration order; first match wins
//! - Rejections become responses here; handler errors are returned to the
//!   HTTP layer untouched

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::header::ALLOW;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::http::response::{apply_no_cache, strip_body_for_head};
use crate::media::MediaType;
use crate::observability::metrics;
use crate::routing::error::{Rejection, RouteError};
use crate::routing::method::{MethodDispatcher, MethodMatch};
use crate::routing::pattern::{PathParams, PathPattern};
use crate::routing::produces::label_response;
use crate::routing::route::{CompiledRoute, HandlerError, RouteDescriptor, RouteInfo};

struct PathEntry {
    pattern: PathPattern,
    methods: MethodDispatcher,
}

/// The compiled, immutable router.
pub struct RouteTable {
    paths: Vec<PathEntry>,
    route_count: usize,
}

/// The routing decision for a request, before any handler runs.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// Run a handler. `head` is set when `HEAD` is served by a `GET` route.
    Handler {
        route: &'a Arc<CompiledRoute>,
        params: PathParams,
        head: bool,
    },
    /// Automatic `OPTIONS` response.
    Options { allow: HeaderValue },
}

impl Resolution<'_> {
    /// The matched route, if a handler was selected.
    pub fn route_info(&self) -> Option<&RouteInfo> {
        match self {
            Resolution::Handler { route, .. } => Some(&route.info),
            Resolution::Options { .. } => None,
        }
    }
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Compile routes in the given order.
    pub fn build<I>(routes: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = RouteDescriptor>,
    {
        let mut paths: Vec<PathEntry> = Vec::new();
        let mut route_count = 0;

        for descriptor in routes {
            let pattern = PathPattern::parse(&descriptor.path)?;
            let consumes = parse_media_type(&descriptor, "consumes", &descriptor.consumes)?;
            let produces = parse_media_type(&descriptor, "produces", &descriptor.produces)?;

            let route = Arc::new(CompiledRoute {
                info: RouteInfo {
                    method: descriptor.method.clone(),
                    path: descriptor.path.clone(),
                    consumes,
                    produces,
                },
                disable_cache: descriptor.disable_cache,
                handler: descriptor.handler,
            });

            let entry = match paths.iter().position(|e| e.pattern == pattern) {
                Some(idx) => &mut paths[idx],
                None => {
                    paths.push(PathEntry {
                        pattern,
                        methods: MethodDispatcher::default(),
                    });
                    let last = paths.len() - 1;
                    &mut paths[last]
                }
            };
            entry.methods.insert(route)?;
            route_count += 1;
        }

        for entry in &mut paths {
            entry.methods.seal();
        }

        tracing::info!(routes = route_count, paths = paths.len(), "Route table compiled");
        Ok(Self { paths, route_count })
    }

    /// Number of registered route descriptors.
    pub fn route_count(&self) -> usize {
        self.route_count
    }

    /// Declared path patterns in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &PathPattern> {
        self.paths.iter().map(|e| &e.pattern)
    }

    /// Decide how a request would be handled, without running anything.
    pub fn resolve<B>(&self, request: &Request<B>) -> Result<Resolution<'_>, Rejection> {
        let path = request.uri().path();
        let (entry, params) = self
            .paths
            .iter()
            .find_map(|e| e.pattern.matches(path).map(|params| (e, params)))
            .ok_or(Rejection::PathNotFound)?;

        let (consumers, head) = match entry.methods.select(request.method()) {
            MethodMatch::Declared(d) => (d, false),
            MethodMatch::HeadFromGet(d) => (d, true),
            MethodMatch::Options(allow) => return Ok(Resolution::Options { allow }),
            MethodMatch::NotAllowed(allow) => return Err(Rejection::MethodNotAllowed { allow }),
        };

        let negotiator = consumers.select(request.headers())?;
        let route = negotiator.negotiate(request.headers())?;
        Ok(Resolution::Handler {
            route,
            params,
            head,
        })
    }

    /// Route a request and run the selected handler.
    ///
    /// Routing failures are answered with their status code. A handler
    /// error is returned as-is and no response headers are applied.
    pub async fn dispatch(&self, mut request: Request<Body>) -> Result<Response, HandlerError> {
        let started = Instant::now();

        let (route, params, head) = match self.resolve(&request) {
            Err(rejection) => {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    status = rejection.status().as_u16(),
                    "Request rejected by router"
                );
                metrics::record_dispatch(rejection.outcome(), started);
                return Ok(rejection.into_response());
            }
            Ok(Resolution::Options { allow }) => {
                metrics::record_dispatch("options", started);
                let mut response = StatusCode::OK.into_response();
                response.headers_mut().insert(ALLOW, allow);
                return Ok(response);
            }
            Ok(Resolution::Handler { route, params, head }) => (Arc::clone(route), params, head),
        };

        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            route = %route.info.path,
            consumes = %route.info.consumes,
            produces = %route.info.produces,
            "Route matched"
        );

        request.extensions_mut().insert(params);
        request.extensions_mut().insert(route.info.clone());

        let mut response = match route.handler.call(request).await {
            Ok(response) => response,
            Err(err) => {
                metrics::record_dispatch("handler_error", started);
                return Err(err);
            }
        };

        label_response(&route.info.produces, &mut response);
        if route.disable_cache {
            apply_no_cache(response.headers_mut());
        }
        if head {
            response = strip_body_for_head(response);
        }

        metrics::record_dispatch("matched", started);
        Ok(response)
    }
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("paths", &self.paths.iter().map(|e| e.pattern.as_str()).collect::<Vec<_>>())
            .field("route_count", &self.route_count)
            .finish()
    }
}

fn parse_media_type(
    descriptor: &RouteDescriptor,
    role: &'static str,
    value: &str,
) -> Result<MediaType, RouteError> {
    MediaType::parse(value).map_err(|source| RouteError::MediaType {
        method: descriptor.method.to_string(),
        path: descriptor.path.clone(),
        role,
        source,
    })
}

/// Collects descriptors for `RouteTable::build`.
#[derive(Default)]
pub struct RouteTableBuilder {
    routes: Vec<RouteDescriptor>,
}

impl RouteTableBuilder {
    pub fn route(mut self, descriptor: RouteDescriptor) -> Self {
        self.routes.push(descriptor);
        self
    }

    pub fn push(&mut self, descriptor: RouteDescriptor) {
        self.routes.push(descriptor);
    }

    pub fn build(self) -> Result<RouteTable, RouteError> {
        RouteTable::build(self.routes)
    }
}
