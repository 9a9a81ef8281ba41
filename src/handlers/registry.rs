//! Handlers addressable by name from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RouteConfig;
use crate::handlers::fixed::FixedResponse;
use crate::handlers::status::{get_health, get_status, ROBOTS_TXT};
use crate::routing::{handler_fn, Handler};

pub const ROBOTS: &str = "robots";
pub const HEALTH: &str = "health";
pub const STATUS: &str = "status";
/// Answers with the route's configured `body`.
pub const FIXED: &str = "fixed";

/// Name → handler lookup used when building routes from configuration.
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// An empty registry; `fixed` is still available.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The registry with `robots`, `health` and `status`.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(ROBOTS, Arc::new(FixedResponse::new(ROBOTS_TXT)));
        registry.register(HEALTH, handler_fn(get_health));
        registry.register(STATUS, handler_fn(get_status));
        registry
    }

    /// Add or replace a named handler.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Whether a route may name `name`; `fixed` is always available.
    pub fn contains(&self, name: &str) -> bool {
        name == FIXED || self.handlers.contains_key(name)
    }

    /// The handler for a configured route, if its name is registered.
    pub fn resolve(&self, route: &RouteConfig) -> Option<Arc<dyn Handler>> {
        if route.handler == FIXED {
            let body = route.body.clone().unwrap_or_default();
            return Some(Arc::new(FixedResponse::new(body)));
        }
        self.handlers.get(&route.handler).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(handler: &str, body: Option<&str>) -> RouteConfig {
        RouteConfig {
            method: "GET".to_string(),
            path: "/".to_string(),
            consumes: "*/*".to_string(),
            produces: "*/*".to_string(),
            handler: handler.to_string(),
            body: body.map(str::to_string),
            disable_cache: false,
        }
    }

    #[test]
    fn test_builtin_names() {
        let registry = HandlerRegistry::builtin();
        for name in [ROBOTS, HEALTH, STATUS] {
            assert!(registry.resolve(&route(name, None)).is_some(), "{}", name);
            assert!(registry.contains(name));
        }
        assert!(registry.resolve(&route("nope", None)).is_none());
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn test_fixed_always_resolves() {
        let registry = HandlerRegistry::empty();
        assert!(registry.resolve(&route(FIXED, Some("x"))).is_some());
        assert!(registry.resolve(&route(ROBOTS, None)).is_none());
        assert!(registry.contains(FIXED));
        assert!(!registry.contains(ROBOTS));
    }
}
