//! Built-in service endpoints.

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::routing::HandlerError;

pub const ROBOTS_TXT: &str = "User-agent: *\nAllow: /$\nAllow: /assets\nDisallow: /\n";

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

/// `GET /status`
pub async fn get_status(_request: Request<Body>) -> Result<Response, HandlerError> {
    Ok(Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
    .into_response())
}

/// `GET /health`
pub async fn get_health(_request: Request<Body>) -> Result<Response, HandlerError> {
    Ok(Response::new(Body::from("OK")))
}
