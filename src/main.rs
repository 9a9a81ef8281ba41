//! media-router binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server (request id, trace, timeout, catch-panic)
//!                          │
//!                          ▼
//!                      routing::RouteTable
//!                          path → method → Content-Type → Accept
//!                          │
//!                          ▼
//!                      handlers (robots, health, status, fixed)
//!                          │
//!     Client Response      ▼
//!     ◀─────────────── Vary / Content-Type / cache headers
//! ```
//!
//! Usage: `media-router [CONFIG]`. Without a config file the built-in
//! routes are served on the default address.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use media_router::config::{load_config, AppConfig};
use media_router::handlers::HandlerRegistry;
use media_router::lifecycle::startup;
use media_router::observability::logging;

#[derive(Parser)]
#[command(name = "media-router")]
#[command(about = "HTTP router with content negotiation", long_about = None)]
struct Cli {
    /// TOML configuration file
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let registry = HandlerRegistry::builtin();
    let config = match &cli.config {
        Some(path) => match load_config(path, &registry) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("media-router: {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?cli.config,
        routes = config.routes.len(),
        "media-router starting"
    );

    if let Err(e) = startup::run(config, registry).await {
        tracing::error!(error = %e, "Fatal error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
