//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (dispatch outcomes, latency)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by outcome
//!   (`matched`, `options`, `not_found`, `method_not_allowed`,
//!   `unsupported_media_type`, `not_acceptable`, `handler_error`)
//! - `router_dispatch_duration_seconds` (histogram): time spent routing and
//!   running the handler
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Labels are static strings; no per-path cardinality

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const REQUESTS_TOTAL: &str = "router_requests_total";
pub const DISPATCH_DURATION: &str = "router_dispatch_duration_seconds";

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    metrics::describe_counter!(REQUESTS_TOTAL, "Requests dispatched by the router, by outcome");
    metrics::describe_histogram!(
        DISPATCH_DURATION,
        metrics::Unit::Seconds,
        "Time spent routing and running the handler"
    );

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one dispatched request.
pub fn record_dispatch(outcome: &'static str, started: Instant) {
    metrics::counter!(REQUESTS_TOTAL, "outcome" => outcome).increment(1);
    metrics::histogram!(DISPATCH_DURATION, "outcome" => outcome)
        .record(started.elapsed().as_secs_f64());
}
