//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the media router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route declarations, in registration order.
    pub routes: Vec<RouteConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            routes: RouteConfig::builtin(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A declared route.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// HTTP method, matched exactly.
    pub method: String,

    /// Path pattern, e.g. `/users/{id}` or `/static/*`.
    pub path: String,

    /// Accepted request media type.
    #[serde(default = "default_media_type")]
    pub consumes: String,

    /// Emitted response media type.
    #[serde(default = "default_media_type")]
    pub produces: String,

    /// Name of a registered handler (`robots`, `health`, `status`, `fixed`).
    pub handler: String,

    /// Response body for the `fixed` handler.
    #[serde(default)]
    pub body: Option<String>,

    /// Add headers forbidding client caching.
    #[serde(default)]
    pub disable_cache: bool,
}

fn default_media_type() -> String {
    "*/*".to_string()
}

impl RouteConfig {
    /// Routes served when no configuration file is given.
    pub fn builtin() -> Vec<RouteConfig> {
        let route = |path: &str, produces: &str, handler: &str, disable_cache: bool| RouteConfig {
            method: "GET".to_string(),
            path: path.to_string(),
            consumes: default_media_type(),
            produces: produces.to_string(),
            handler: handler.to_string(),
            body: None,
            disable_cache,
        };
        vec![
            route("/robots.txt", "text/plain; charset=utf-8", "robots", false),
            route("/health", "text/plain; charset=utf-8", "health", true),
            route("/status", "application/json", "status", true),
        ]
    }
}
