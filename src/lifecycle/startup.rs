//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn configured routes into a `RouteTable`
//! - Initialize subsystems in dependency order (metrics, routes, listener)
//! - Run the server until a termination signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last (traffic only when the route table is ready)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{AppConfig, RouteConfig};
use crate::handlers::HandlerRegistry;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::routing::{RouteDescriptor, RouteError, RouteTable};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("routes[{index}]: invalid method {method:?}")]
    InvalidMethod { index: usize, method: String },

    #[error("routes[{index}]: no handler named {handler:?}")]
    UnknownHandler { index: usize, handler: String },

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Translate configured routes into descriptors, in order.
pub fn route_descriptors(
    routes: &[RouteConfig],
    registry: &HandlerRegistry,
) -> Result<Vec<RouteDescriptor>, StartupError> {
    routes
        .iter()
        .enumerate()
        .map(|(index, route)| {
            let method = Method::from_bytes(route.method.as_bytes()).map_err(|_| {
                StartupError::InvalidMethod {
                    index,
                    method: route.method.clone(),
                }
            })?;
            let handler = registry
                .resolve(route)
                .ok_or_else(|| StartupError::UnknownHandler {
                    index,
                    handler: route.handler.clone(),
                })?;

            let mut descriptor = RouteDescriptor::new(method, route.path.clone(), handler)
                .consumes(route.consumes.clone())
                .produces(route.produces.clone());
            if route.disable_cache {
                descriptor = descriptor.disable_cache();
            }
            Ok(descriptor)
        })
        .collect()
}

/// Build the route table for a configuration.
pub fn build_route_table(
    routes: &[RouteConfig],
    registry: &HandlerRegistry,
) -> Result<RouteTable, StartupError> {
    let descriptors = route_descriptors(routes, registry)?;
    Ok(RouteTable::build(descriptors)?)
}

/// Start everything and serve until SIGINT/SIGTERM.
pub async fn run(config: AppConfig, registry: HandlerRegistry) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let table = Arc::new(build_route_table(&config.routes, &registry)?);

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;
    tracing::info!(
        address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    HttpServer::new(&config, table)
        .run(listener, receiver)
        .await
        .map_err(StartupError::Serve)
}
