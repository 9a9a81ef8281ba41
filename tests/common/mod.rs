//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use media_router::config::AppConfig;
use media_router::handlers::HandlerRegistry;
use media_router::http::{matched_route, HttpServer};
use media_router::lifecycle::startup::build_route_table;
use media_router::lifecycle::Shutdown;
use media_router::routing::{handler_fn, Handler, HandlerError, RouteDescriptor, RouteTable};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// A handler answering `label` and exposing the matched route in
/// `x-route` (`METHOD path consumes -> produces`).
pub fn labelled(label: &'static str) -> Arc<dyn Handler> {
    handler_fn(move |request: Request<Body>| async move {
        let route = matched_route(&request)
            .map(|r| format!("{} {} {} -> {}", r.method, r.path, r.consumes, r.produces))
            .unwrap_or_default();
        let mut response = Response::new(Body::from(label));
        if let Ok(value) = route.parse() {
            response.headers_mut().insert("x-route", value);
        }
        Ok::<_, HandlerError>(response)
    })
}

/// A handler answering with a status and no body.
pub fn status_only(status: StatusCode) -> Arc<dyn Handler> {
    handler_fn(move |_request: Request<Body>| async move {
        Ok::<_, HandlerError>(status.into_response())
    })
}

/// A handler that always fails.
pub fn failing() -> Arc<dyn Handler> {
    handler_fn(|_request: Request<Body>| async {
        Err::<Response, HandlerError>("storage unavailable".into())
    })
}

pub fn route(method: Method, path: &str, handler: Arc<dyn Handler>) -> RouteDescriptor {
    RouteDescriptor::new(method, path, handler)
}

/// Fully layered app around the given routes.
pub fn app(routes: Vec<RouteDescriptor>) -> Router {
    let table = RouteTable::build(routes).expect("route table");
    HttpServer::new(&AppConfig::default(), Arc::new(table)).router()
}

/// App serving the built-in routes.
pub fn builtin_app() -> Router {
    let config = AppConfig::default();
    let table = build_route_table(&config.routes, &HandlerRegistry::builtin()).unwrap();
    HttpServer::new(&config, Arc::new(table)).router()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn header_all(&self, name: &str) -> Vec<String> {
        self.headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }
}

/// Send a request through the app in-process.
pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// Build a request with optional `Content-Type` and `Accept`.
pub fn request(
    method: Method,
    path: &str,
    content_type: Option<&str>,
    accept: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(ct) = content_type {
        builder = builder.header("content-type", ct);
    }
    if let Some(accept) = accept {
        builder = builder.header("accept", accept);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn get(app: &Router, path: &str) -> TestResponse {
    send(app, request(Method::GET, path, None, None)).await
}

/// Serve `routes` over TCP on an ephemeral port.
pub async fn start_server(routes: Vec<RouteDescriptor>) -> (SocketAddr, Shutdown) {
    let table = RouteTable::build(routes).expect("route table");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let server = HttpServer::new(&AppConfig::default(), Arc::new(table));
    tokio::spawn(async move {
        server.run(listener, receiver).await.unwrap();
    });

    (addr, shutdown)
}
