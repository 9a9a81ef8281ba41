//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference registered handlers)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: (AppConfig, HandlerRegistry) → Result<(), Vec<ValidationError>>
//! - Patterns and media types are checked when the route table is built,
//!   where duplicate and ambiguous routes are also detected

use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::handlers::registry::{HandlerRegistry, FIXED};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("routes[{index}]: invalid method {method:?}")]
    Method { index: usize, method: String },

    #[error("routes[{index}]: unknown handler {handler:?}")]
    UnknownHandler { index: usize, handler: String },

    #[error("routes[{index}]: handler \"fixed\" requires a body")]
    MissingBody { index: usize },
}

/// Check a parsed configuration against the handlers it may name.
pub fn validate_config(
    config: &AppConfig,
    registry: &HandlerRegistry,
) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    for (index, route) in config.routes.iter().enumerate() {
        if route.method.is_empty() || Method::from_bytes(route.method.as_bytes()).is_err() {
            errors.push(ValidationError::Method {
                index,
                method: route.method.clone(),
            });
        }
        if !registry.contains(&route.handler) {
            errors.push(ValidationError::UnknownHandler {
                index,
                handler: route.handler.clone(),
            });
        } else if route.handler == FIXED && route.body.is_none() {
            errors.push(ValidationError::MissingBody { index });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::schema::RouteConfig;
    use crate::handlers::fixed::FixedResponse;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default(), &HandlerRegistry::builtin()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        config.timeouts.request_secs = 0;
        config.routes.push(RouteConfig {
            method: String::new(),
            path: "/x".to_string(),
            consumes: "*/*".to_string(),
            produces: "*/*".to_string(),
            handler: "missing".to_string(),
            body: None,
            disable_cache: false,
        });

        let errors = validate_config(&config, &HandlerRegistry::builtin()).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("not-an-address".to_string()),
                ValidationError::ZeroTimeout,
                ValidationError::Method {
                    index: 3,
                    method: String::new()
                },
                ValidationError::UnknownHandler {
                    index: 3,
                    handler: "missing".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_routes_allowed() {
        let mut config = AppConfig::default();
        config.routes.clear();
        assert!(validate_config(&config, &HandlerRegistry::builtin()).is_ok());
    }

    #[test]
    fn test_custom_registered_handler() {
        let mut config = AppConfig::default();
        config.routes = vec![RouteConfig {
            method: "GET".to_string(),
            path: "/custom".to_string(),
            consumes: "*/*".to_string(),
            produces: "*/*".to_string(),
            handler: "custom".to_string(),
            body: None,
            disable_cache: false,
        }];

        let mut registry = HandlerRegistry::builtin();
        registry.register("custom", Arc::new(FixedResponse::new("custom")));
        assert_eq!(validate_config(&config, &registry), Ok(()));

        assert_eq!(
            validate_config(&config, &HandlerRegistry::builtin()),
            Err(vec![ValidationError::UnknownHandler {
                index: 0,
                handler: "custom".to_string()
            }])
        );
    }

    #[test]
    fn test_fixed_handler_needs_body() {
        let mut config = AppConfig::default();
        config.routes = vec![RouteConfig {
            method: "GET".to_string(),
            path: "/".to_string(),
            consumes: "*/*".to_string(),
            produces: "text/plain".to_string(),
            handler: "fixed".to_string(),
            body: None,
            disable_cache: false,
        }];
        assert_eq!(
            validate_config(&config, &HandlerRegistry::builtin()),
            Err(vec![ValidationError::MissingBody { index: 0 }])
        );
    }
}
