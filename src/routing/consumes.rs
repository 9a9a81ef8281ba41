//! Request media dispatch (`Content-Type` direction).
//!
//! # Responsibilities
//! - Pick the `consumes` type that matches the request body's media type
//! - Reject with `415 Unsupported Media Type` when none does
//! - Refuse, at build time, consumes types that could tie at runtime
//!
//! # Design Decisions
//! - A missing `Content-Type` is `*/*`: only a bare `*/*` route accepts it
//! - A malformed `Content-Type` is likewise only accepted by `*/*`
//! - Most specific match wins; ties are made impossible by `insert`

use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;

use crate::media::MediaType;
use crate::routing::error::{Rejection, RouteError};
use crate::routing::produces::ProducesNegotiator;
use crate::routing::route::CompiledRoute;

/// The routes sharing one `(path, method)`, keyed by `consumes`.
#[derive(Debug, Default)]
pub struct ConsumesDispatcher {
    entries: Vec<(MediaType, ProducesNegotiator)>,
}

impl ConsumesDispatcher {
    pub(crate) fn insert(&mut self, route: Arc<CompiledRoute>) -> Result<(), RouteError> {
        let consumes = &route.info.consumes;
        if let Some((_, negotiator)) = self.entries.iter_mut().find(|(t, _)| t == consumes) {
            return negotiator.insert(route);
        }

        if let Some((existing, _)) = self.entries.iter().find(|(t, _)| {
            t.specificity() == consumes.specificity() && t.overlaps(consumes)
        }) {
            return Err(RouteError::AmbiguousConsumes {
                method: route.info.method.to_string(),
                path: route.info.path.clone(),
                first: existing.to_string(),
                second: consumes.to_string(),
            });
        }

        let consumes = consumes.clone();
        let mut negotiator = ProducesNegotiator::default();
        negotiator.insert(route)?;
        self.entries.push((consumes, negotiator));
        Ok(())
    }

    /// Declared `consumes` types in registration order.
    pub fn media_types(&self) -> impl Iterator<Item = &MediaType> {
        self.entries.iter().map(|(t, _)| t)
    }

    /// Choose the negotiator for the request's `Content-Type`.
    pub(crate) fn select(&self, headers: &HeaderMap) -> Result<&ProducesNegotiator, Rejection> {
        let request_type = match headers.get(CONTENT_TYPE) {
            None => MediaType::any(),
            Some(value) => match value.to_str().ok().map(MediaType::parse) {
                Some(Ok(parsed)) => parsed,
                _ => {
                    tracing::warn!(content_type = ?value, "Malformed Content-Type header");
                    return self
                        .entries
                        .iter()
                        .find(|(t, _)| t.is_any())
                        .map(|(_, n)| n)
                        .ok_or(Rejection::UnsupportedMediaType);
                }
            },
        };

        let mut best: Option<&(MediaType, ProducesNegotiator)> = None;
        for entry in self
            .entries
            .iter()
            .filter(|(t, _)| t.matches_request_type(&request_type))
        {
            if best.map_or(true, |(b, _)| entry.0.specificity() > b.specificity()) {
                best = Some(entry);
            }
        }
        best.map(|(_, n)| n).ok_or(Rejection::UnsupportedMediaType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::route::{handler_fn, HandlerError, RouteInfo};
    use axum::http::{HeaderValue, Method};
    use axum::response::IntoResponse;

    fn route(consumes: &str, produces: &str) -> Arc<CompiledRoute> {
        Arc::new(CompiledRoute {
            info: RouteInfo {
                method: Method::POST,
                path: "/upload".to_string(),
                consumes: MediaType::parse(consumes).unwrap(),
                produces: MediaType::parse(produces).unwrap(),
            },
            disable_cache: false,
            handler: handler_fn(|_req| async { Ok::<_, HandlerError>(().into_response()) }),
        })
    }

    fn dispatcher(types: &[&str]) -> ConsumesDispatcher {
        let mut d = ConsumesDispatcher::default();
        for t in types {
            d.insert(route(t, "*/*")).unwrap();
        }
        d
    }

    /// Returns the consumes type that was selected, identified by position.
    fn pick(d: &ConsumesDispatcher, content_type: Option<&str>) -> Result<String, Rejection> {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(ct).unwrap());
        }
        let chosen = d.select(&headers)?;
        let idx = d
            .entries
            .iter()
            .position(|(_, n)| std::ptr::eq(n, chosen))
            .unwrap();
        Ok(d.entries[idx].0.to_string())
    }

    #[test]
    fn test_no_media_types_allowed() {
        let d = dispatcher(&[]);
        assert_eq!(pick(&d, Some("text/plain")), Err(Rejection::UnsupportedMediaType));
        assert_eq!(pick(&d, None), Err(Rejection::UnsupportedMediaType));
    }

    #[test]
    fn test_unrelated_media_types() {
        let d = dispatcher(&["text/plain", "application/json"]);
        assert_eq!(pick(&d, Some("text/plain")).unwrap(), "text/plain");
        assert_eq!(pick(&d, Some("application/json")).unwrap(), "application/json");
        assert_eq!(pick(&d, Some("foo/bar")), Err(Rejection::UnsupportedMediaType));
        assert_eq!(pick(&d, None), Err(Rejection::UnsupportedMediaType));
    }

    #[test]
    fn test_most_specific_media_type() {
        let d = dispatcher(&["text/plain", "text/plain;charset=utf-8", "text/*"]);
        assert_eq!(
            pick(&d, Some("text/plain;charset=utf-8")).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(pick(&d, Some("text/plain;charset=us-ascii")).unwrap(), "text/plain");
        assert_eq!(pick(&d, Some("text/plain")).unwrap(), "text/plain");
        assert_eq!(pick(&d, Some("text/css")).unwrap(), "text/*");
        assert_eq!(pick(&d, Some("foo/bar")), Err(Rejection::UnsupportedMediaType));
        assert_eq!(pick(&d, None), Err(Rejection::UnsupportedMediaType));
    }

    #[test]
    fn test_charset_handler_needs_charset() {
        let d = dispatcher(&["text/plain;charset=utf-8"]);
        assert_eq!(pick(&d, Some("text/plain")), Err(Rejection::UnsupportedMediaType));
    }

    #[test]
    fn test_any_media_type() {
        let d = dispatcher(&["*/*"]);
        assert_eq!(pick(&d, Some("foo/bar")).unwrap(), "*/*");
        assert_eq!(pick(&d, None).unwrap(), "*/*");
        assert_eq!(pick(&d, Some("not a media type")).unwrap(), "*/*");
    }

    #[test]
    fn test_malformed_content_type_without_wildcard() {
        let d = dispatcher(&["text/plain"]);
        assert_eq!(pick(&d, Some("text")), Err(Rejection::UnsupportedMediaType));
    }

    #[test]
    fn test_same_consumes_different_produces_share_entry() {
        let mut d = ConsumesDispatcher::default();
        d.insert(route("text/plain", "text/html")).unwrap();
        d.insert(route("text/plain", "application/json")).unwrap();
        assert_eq!(d.media_types().count(), 1);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut d = ConsumesDispatcher::default();
        d.insert(route("text/plain", "*/*")).unwrap();
        assert!(matches!(
            d.insert(route("text/plain", "*/*")),
            Err(RouteError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_ambiguous_consumes_rejected() {
        let mut d = ConsumesDispatcher::default();
        d.insert(route("text/plain;a=1", "*/*")).unwrap();
        assert!(matches!(
            d.insert(route("text/plain;b=2", "*/*")),
            Err(RouteError::AmbiguousConsumes { .. })
        ));
        // Conflicting values can never match the same request.
        d.insert(route("text/plain;a=2", "*/*")).unwrap();
    }
}
