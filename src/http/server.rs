//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router that hands every request to the `RouteTable`
//! - Wire up middleware (request ID, tracing, timeout, panic capture)
//! - Map handler failures to `500`
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, X_REQUEST_ID};
use crate::lifecycle::shutdown;
use crate::routing::RouteTable;

/// HTTP front end for a compiled route table.
pub struct HttpServer {
    router: Router,
    table: Arc<RouteTable>,
}

impl HttpServer {
    pub fn new(config: &AppConfig, table: Arc<RouteTable>) -> Self {
        let router = Self::build_router(config, Arc::clone(&table));
        Self { router, table }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, table: Arc<RouteTable>) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(table)
            .layer(CatchPanicLayer::new())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(propagate_request_id_layer())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id
                    )
                }),
            )
            .layer(set_request_id_layer())
    }

    /// The fully layered Axum router, e.g. for in-process `oneshot` calls.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn route_table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.table.route_count(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Fallback handler: every request goes through the route table.
async fn dispatch_handler(
    State(table): State<Arc<RouteTable>>,
    request: Request<Body>,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    match table.dispatch(request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(
                method = %method,
                path = %path,
                error = %err,
                "Handler failed"
            );
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
