//! Routing failures.
//!
//! Two families:
//! - `RouteError`: the route table cannot be built. Fatal at startup.
//! - `Rejection`: a request could not be routed. Answered locally with a
//!   status code; never propagated.

use axum::http::header::{ALLOW, VARY};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::media::MediaTypeError;
use crate::routing::pattern::PatternError;

/// Error building a `RouteTable`.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("route {method} {path}: invalid {role} media type: {source}")]
    MediaType {
        method: String,
        path: String,
        role: &'static str,
        #[source]
        source: MediaTypeError,
    },

    #[error("duplicate route {method} {path} consumes {consumes} produces {produces}")]
    Duplicate {
        method: String,
        path: String,
        consumes: String,
        produces: String,
    },

    #[error("ambiguous routes {method} {path}: consumes {first} and {second} can match the same request")]
    AmbiguousConsumes {
        method: String,
        path: String,
        first: String,
        second: String,
    },
}

/// Why a request could not be dispatched to a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// No path pattern matched: `404`.
    PathNotFound,
    /// Path matched but no route for the method: `405` with `Allow`.
    MethodNotAllowed { allow: HeaderValue },
    /// No route consumes the request `Content-Type`: `415`.
    UnsupportedMediaType,
    /// No route produces a type the client accepts: `406`.
    NotAcceptable,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::PathNotFound => StatusCode::NOT_FOUND,
            Rejection::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Rejection::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Rejection::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
        }
    }

    /// Label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Rejection::PathNotFound => "not_found",
            Rejection::MethodNotAllowed { .. } => "method_not_allowed",
            Rejection::UnsupportedMediaType => "unsupported_media_type",
            Rejection::NotAcceptable => "not_acceptable",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        match self {
            Rejection::MethodNotAllowed { allow } => {
                response.headers_mut().insert(ALLOW, allow);
            }
            Rejection::NotAcceptable => {
                response
                    .headers_mut()
                    .insert(VARY, HeaderValue::from_static("Accept"));
            }
            Rejection::PathNotFound | Rejection::UnsupportedMediaType => {}
        }
        response
    }
}
