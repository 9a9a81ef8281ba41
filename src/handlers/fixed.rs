//! Handler answering every request with the same body.

use axum::body::{Body, Bytes};
use axum::http::Request;
use axum::response::Response;
use futures_util::future::{self, BoxFuture};

use crate::routing::{Handler, HandlerError};

/// Responds `200` with a fixed body.
///
/// The body carries no `Content-Type`; the router labels it with the
/// route's `produces` type.
#[derive(Debug, Clone)]
pub struct FixedResponse {
    body: Bytes,
}

impl FixedResponse {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl Handler for FixedResponse {
    fn call(&self, _request: Request<Body>) -> BoxFuture<'static, Result<Response, HandlerError>> {
        let response = Response::new(Body::from(self.body.clone()));
        Box::pin(future::ready(Ok(response)))
    }
}
