//! Method dispatch for a single path.
//!
//! # Responsibilities
//! - Select the routes registered for the request method
//! - Answer `OPTIONS` automatically with an `Allow` header
//! - Serve `HEAD` through the `GET` routes when no `HEAD` route exists
//! - Reject other methods with `405` and an `Allow` header
//!
//! # Design Decisions
//! - Method comparison is exact and case-sensitive
//! - Explicit `OPTIONS`/`HEAD` routes replace the automatic behavior
//! - `Allow` is computed once, after all routes are registered

use std::sync::Arc;

use axum::http::{HeaderValue, Method};

use crate::routing::consumes::ConsumesDispatcher;
use crate::routing::error::RouteError;
use crate::routing::route::CompiledRoute;

/// Outcome of method selection.
#[derive(Debug)]
pub enum MethodMatch<'a> {
    /// A route was declared for the method.
    Declared(&'a ConsumesDispatcher),
    /// `HEAD` served by the `GET` routes; the body must be dropped.
    HeadFromGet(&'a ConsumesDispatcher),
    /// Automatic `OPTIONS` response.
    Options(HeaderValue),
    /// `405 Method Not Allowed`.
    NotAllowed(HeaderValue),
}

/// The routes sharing one path pattern, keyed by method.
#[derive(Debug)]
pub struct MethodDispatcher {
    methods: Vec<(Method, ConsumesDispatcher)>,
    allow: HeaderValue,
}

impl Default for MethodDispatcher {
    fn default() -> Self {
        Self {
            methods: Vec::new(),
            allow: HeaderValue::from_static("OPTIONS"),
        }
    }
}

impl MethodDispatcher {
    pub(crate) fn insert(&mut self, route: Arc<CompiledRoute>) -> Result<(), RouteError> {
        let method = route.info.method.clone();
        match self.methods.iter_mut().find(|(m, _)| *m == method) {
            Some((_, dispatcher)) => dispatcher.insert(route),
            None => {
                let mut dispatcher = ConsumesDispatcher::default();
                dispatcher.insert(route)?;
                self.methods.push((method, dispatcher));
                Ok(())
            }
        }
    }

    /// Recompute the `Allow` header. Called once the table is complete.
    pub(crate) fn seal(&mut self) {
        let allowed = self.allowed_methods();
        let joined = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        // Method names are tokens, so this only fails for extension methods
        // with bytes a header cannot carry.
        self.allow = HeaderValue::from_str(&joined)
            .unwrap_or_else(|_| HeaderValue::from_static("OPTIONS"));
    }

    /// Declared methods in registration order, followed by the automatic ones.
    pub fn allowed_methods(&self) -> Vec<Method> {
        let mut allowed: Vec<Method> = self.methods.iter().map(|(m, _)| m.clone()).collect();
        if self.declares(&Method::GET) && !self.declares(&Method::HEAD) {
            allowed.push(Method::HEAD);
        }
        if !self.declares(&Method::OPTIONS) {
            allowed.push(Method::OPTIONS);
        }
        allowed
    }

    pub fn allow_header(&self) -> &HeaderValue {
        &self.allow
    }

    fn declares(&self, method: &Method) -> bool {
        self.methods.iter().any(|(m, _)| m == method)
    }

    fn find(&self, method: &Method) -> Option<&ConsumesDispatcher> {
        self.methods
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, d)| d)
    }

    pub fn select(&self, method: &Method) -> MethodMatch<'_> {
        if let Some(dispatcher) = self.find(method) {
            return MethodMatch::Declared(dispatcher);
        }
        if *method == Method::OPTIONS {
            return MethodMatch::Options(self.allow.clone());
        }
        if *method == Method::HEAD {
            if let Some(dispatcher) = self.find(&Method::GET) {
                return MethodMatch::HeadFromGet(dispatcher);
            }
        }
        MethodMatch::NotAllowed(self.allow.clone())
    }
}
