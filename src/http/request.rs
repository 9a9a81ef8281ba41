//! Request identification and value extraction.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) and echo it on the response
//! - Read path captures, query parameters and the matched route
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - An incoming `x-request-id` is kept as-is
//! - A query parameter given more than once is treated as absent

use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};

use crate::routing::{PathParams, RouteInfo};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Layer assigning `x-request-id` to requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<UuidRequestId> {
    SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId)
}

/// Layer copying `x-request-id` from the request onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// The request ID assigned by `set_request_id_layer`, if any.
pub fn request_id<B>(request: &Request<B>) -> Option<&str> {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
}

/// A named path capture of the matched route. The trailing wildcard is
/// available under `"*"`.
pub fn path_param<'a, B>(request: &'a Request<B>, name: &str) -> Option<&'a str> {
    request.extensions().get::<PathParams>()?.get(name)
}

/// A query parameter, percent-decoded. `None` when absent or repeated.
pub fn query_param<B>(request: &Request<B>, name: &str) -> Option<String> {
    let query = request.uri().query()?;
    let mut found = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key == name {
            if found.is_some() {
                return None;
            }
            found = Some(value.into_owned());
        }
    }
    found
}

/// A query parameter parsed as an integer.
///
/// Returns `if_absent` when the parameter is missing (or repeated) and
/// `if_malformed` when it is not a valid integer.
pub fn query_param_as_int<B>(
    request: &Request<B>,
    name: &str,
    if_absent: i64,
    if_malformed: i64,
) -> i64 {
    match query_param(request, name) {
        None => if_absent,
        Some(value) => value.trim().parse().unwrap_or(if_malformed),
    }
}

/// The route selected for this request.
pub fn matched_route<B>(request: &Request<B>) -> Option<&RouteInfo> {
    request.extensions().get::<RouteInfo>()
}
