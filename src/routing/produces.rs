//! Response media negotiation (`Accept` direction).
//!
//! # Responsibilities
//! - Pick the route whose `produces` type best satisfies the `Accept` header
//! - Reject with `406 Not Acceptable` when nothing is acceptable
//! - Label the response: `Vary: Accept` always, `Content-Type` when safe
//!
//! # Selection
//! ```text
//! Accept entries, ordered by (q desc, specificity desc, header order)
//!     → first entry satisfied by any candidate wins
//!     → within it, the most specific produces type wins
//!     → equal specificity: first registered wins
//! ```
//!
//! # Design Decisions
//! - `q=0` entries never select a route, and refuse the types they cover
//!   for any entry that is not more specific than they are
//! - A malformed `Accept` header is `406`, except that a route producing
//!   exactly `*/*` still accepts it
//! - `Content-Type` is only added for concrete types, and only when the
//!   response has a body or a 2xx status other than 204

use std::sync::Arc;

use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

use crate::http::response::{body_is_empty, merge_vary};
use crate::media::{AcceptEntry, AcceptHeader, MediaType};
use crate::routing::error::{Rejection, RouteError};
use crate::routing::route::CompiledRoute;

/// The routes sharing one `(path, method, consumes)`, keyed by `produces`.
#[derive(Debug, Default)]
pub struct ProducesNegotiator {
    candidates: Vec<Arc<CompiledRoute>>,
}

impl ProducesNegotiator {
    pub(crate) fn insert(&mut self, route: Arc<CompiledRoute>) -> Result<(), RouteError> {
        if self
            .candidates
            .iter()
            .any(|c| c.info.produces == route.info.produces)
        {
            return Err(RouteError::Duplicate {
                method: route.info.method.to_string(),
                path: route.info.path.clone(),
                consumes: route.info.consumes.to_string(),
                produces: route.info.produces.to_string(),
            });
        }
        self.candidates.push(route);
        Ok(())
    }

    /// Declared `produces` types in registration order.
    pub fn media_types(&self) -> impl Iterator<Item = &MediaType> {
        self.candidates.iter().map(|c| &c.info.produces)
    }

    /// Choose a route for the request's `Accept` header(s).
    pub(crate) fn negotiate(&self, headers: &HeaderMap) -> Result<&Arc<CompiledRoute>, Rejection> {
        match parse_accept(headers) {
            Ok(accept) => self.select(&accept).ok_or(Rejection::NotAcceptable),
            Err(reason) => {
                tracing::warn!(reason = %reason, "Malformed Accept header");
                self.candidates
                    .iter()
                    .find(|c| c.info.produces.is_any())
                    .ok_or(Rejection::NotAcceptable)
            }
        }
    }

    pub(crate) fn select(&self, accept: &AcceptHeader) -> Option<&Arc<CompiledRoute>> {
        let (refused, wanted): (Vec<&AcceptEntry>, Vec<&AcceptEntry>) = accept
            .entries()
            .iter()
            .partition(|entry| entry.quality().is_zero());

        wanted.into_iter().find_map(|entry| {
            most_specific(self.candidates.iter().filter(|c| {
                c.info.produces.satisfies(entry.media_type())
                    && !is_refused(&c.info.produces, entry, &refused)
            }))
        })
    }
}

/// A `q=0` entry at least as specific as the selecting entry rules out
/// every candidate it covers.
fn is_refused(produces: &MediaType, entry: &AcceptEntry, refused: &[&AcceptEntry]) -> bool {
    refused.iter().any(|zero| {
        zero.specificity() >= entry.specificity()
            && produces.specificity() >= zero.specificity()
            && produces.satisfies(zero.media_type())
    })
}

/// Highest specificity, keeping the earliest candidate on ties.
fn most_specific<'a, I>(candidates: I) -> Option<&'a Arc<CompiledRoute>>
where
    I: Iterator<Item = &'a Arc<CompiledRoute>>,
{
    let mut best: Option<&'a Arc<CompiledRoute>> = None;
    for candidate in candidates {
        let better = match best {
            Some(current) => {
                candidate.info.produces.specificity() > current.info.produces.specificity()
            }
            None => true,
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

fn parse_accept(headers: &HeaderMap) -> Result<AcceptHeader, String> {
    let mut values = Vec::new();
    for value in headers.get_all(ACCEPT) {
        values.push(value.to_str().map_err(|e| e.to_string())?);
    }
    if values.is_empty() {
        return Ok(AcceptHeader::any());
    }
    AcceptHeader::parse(values).map_err(|e| e.to_string())
}

/// Apply the negotiated response headers after a handler succeeded.
pub(crate) fn label_response(produces: &MediaType, response: &mut Response) {
    merge_vary(response.headers_mut(), "Accept");

    if response.headers().contains_key(CONTENT_TYPE) || produces.has_wildcard() {
        return;
    }

    let status = response.status();
    let has_content_status = status.is_success() && status != StatusCode::NO_CONTENT;
    if !has_content_status && body_is_empty(response.body()) {
        return;
    }

    match HeaderValue::from_str(&produces.to_string()) {
        Ok(value) => {
            response.headers_mut().insert(CONTENT_TYPE, value);
        }
        Err(err) => {
            tracing::warn!(produces = %produces, error = %err, "Cannot encode Content-Type");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::route::{handler_fn, HandlerError, RouteInfo};
    use axum::body::Body;
    use axum::http::header::VARY;
    use axum::http::Method;
    use axum::response::IntoResponse;

    fn route(produces: &str) -> Arc<CompiledRoute> {
        Arc::new(CompiledRoute {
            info: RouteInfo {
                method: Method::GET,
                path: "/".to_string(),
                consumes: MediaType::any(),
                produces: MediaType::parse(produces).unwrap(),
            },
            disable_cache: false,
            handler: handler_fn(|_req| async { Ok::<_, HandlerError>(().into_response()) }),
        })
    }

    fn negotiator(types: &[&str]) -> ProducesNegotiator {
        let mut n = ProducesNegotiator::default();
        for t in types {
            n.insert(route(t)).unwrap();
        }
        n
    }

    fn pick(n: &ProducesNegotiator, accept: Option<&str>) -> Result<String, Rejection> {
        let mut headers = HeaderMap::new();
        if let Some(accept) = accept {
            headers.insert(ACCEPT, HeaderValue::from_str(accept).unwrap());
        }
        n.negotiate(&headers).map(|r| r.info.produces.to_string())
    }

    #[test]
    fn test_no_candidates() {
        let n = negotiator(&[]);
        assert_eq!(pick(&n, Some("text/plain")), Err(Rejection::NotAcceptable));
        assert_eq!(pick(&n, None), Err(Rejection::NotAcceptable));
    }

    #[test]
    fn test_most_specific_media_type() {
        let n = negotiator(&["text/plain", "text/plain;charset=utf-8", "text/*"]);
        assert_eq!(
            pick(&n, Some("text/plain;charset=utf-8")).unwrap(),
            "text/plain; charset=utf-8"
        );
        assert_eq!(pick(&n, Some("text/plain;charset=us-ascii")).unwrap(), "text/plain");
        assert_eq!(pick(&n, Some("text/plain")).unwrap(), "text/plain; charset=utf-8");
        assert_eq!(pick(&n, Some("text/css")).unwrap(), "text/*");
        assert_eq!(pick(&n, Some("foo/bar")), Err(Rejection::NotAcceptable));
    }

    #[test]
    fn test_wildcards_and_quality() {
        let n = negotiator(&[
            "text/*",
            "text/*; charset=utf-8",
            "text/html",
            "text/html; charset=utf-8",
            "*/*",
            "*/*; charset=utf-8",
        ]);
        let cases = [
            ("application/json, text/xml, text/html", "*/*; charset=utf-8"),
            ("application/json;q=0.5, text/xml, text/html", "text/*; charset=utf-8"),
            (
                "application/json;q=0.5, text/xml;q=0.5, text/html",
                "text/html; charset=utf-8",
            ),
            ("application/json, text/xml, text/*", "*/*; charset=utf-8"),
            ("application/json;q=0.5, text/xml, text/*", "text/*; charset=utf-8"),
            (
                "application/json;q=0.5, text/xml;q=0.5, text/*",
                "text/html; charset=utf-8",
            ),
            (
                "application/json;q=0.5, text/xml;q=0.5, */*",
                "text/html; charset=utf-8",
            ),
            ("application/json;charset=utf-16, text/xml, text/html", "*/*"),
            (
                "application/json;charset=utf-16;q=0.5, text/xml;charset=utf-16, text/html",
                "text/*",
            ),
            (
                "application/json;charset=utf-16;q=0.5, text/xml;charset=utf-16;q=0.5, text/html;charset=utf-16",
                "text/html",
            ),
        ];
        for (accept, expected) in cases {
            assert_eq!(pick(&n, Some(accept)).unwrap(), expected, "Accept: {}", accept);
        }
    }

    #[test]
    fn test_accept_specificity_beats_handler_specificity() {
        let n = negotiator(&["text/plain;format=flowed", "foo/bar;a=1;b=2"]);
        assert_eq!(
            pick(&n, Some("*/*, text/*, text/plain, text/plain;format=flowed")).unwrap(),
            "text/plain; format=flowed"
        );
    }

    #[test]
    fn test_zero_quality_never_selects() {
        let n = negotiator(&["text/plain"]);
        assert_eq!(pick(&n, Some("text/plain;q=0")), Err(Rejection::NotAcceptable));
    }

    #[test]
    fn test_zero_quality_refuses_type_under_wildcard() {
        let plain = negotiator(&["text/plain"]);
        assert_eq!(
            pick(&plain, Some("text/plain;q=0, */*")),
            Err(Rejection::NotAcceptable)
        );
        assert_eq!(
            pick(&plain, Some("text/*;q=0, */*")),
            Err(Rejection::NotAcceptable)
        );

        let charset = negotiator(&["text/plain;charset=utf-8"]);
        assert_eq!(
            pick(&charset, Some("text/plain;q=0, */*")),
            Err(Rejection::NotAcceptable)
        );

        let both = negotiator(&["text/plain", "application/json"]);
        assert_eq!(pick(&both, Some("text/plain;q=0, */*")).unwrap(), "application/json");

        let any = negotiator(&["*/*"]);
        assert_eq!(pick(&any, Some("text/plain;q=0, */*")).unwrap(), "*/*");
    }

    #[test]
    fn test_more_specific_entry_overrides_zero_quality() {
        let n = negotiator(&["text/plain"]);
        assert_eq!(pick(&n, Some("*/*;q=0, text/plain")).unwrap(), "text/plain");
        assert_eq!(pick(&n, Some("text/*;q=0, text/plain;q=0.5")).unwrap(), "text/plain");
    }

    #[test]
    fn test_equal_specificity_first_registered() {
        let n = negotiator(&["text/plain", "application/json"]);
        assert_eq!(pick(&n, None).unwrap(), "text/plain");
        assert_eq!(pick(&n, Some("*/*")).unwrap(), "text/plain");
    }

    #[test]
    fn test_malformed_accept() {
        let strict = negotiator(&["text/plain"]);
        assert_eq!(
            pick(&strict, Some("invalid_media_type")),
            Err(Rejection::NotAcceptable)
        );

        let any = negotiator(&["text/plain", "*/*"]);
        assert_eq!(pick(&any, Some("invalid_media_type")).unwrap(), "*/*");
    }

    #[test]
    fn test_duplicate_produces_rejected() {
        let mut n = negotiator(&["text/plain"]);
        assert!(matches!(
            n.insert(route("TEXT/plain")),
            Err(RouteError::Duplicate { .. })
        ));
    }

    fn response(status: StatusCode, body: &'static str) -> Response {
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        response
    }

    #[test]
    fn test_content_type_rules() {
        let plain = MediaType::parse("text/plain").unwrap();

        let mut ok = response(StatusCode::OK, "");
        label_response(&plain, &mut ok);
        assert_eq!(ok.headers()[CONTENT_TYPE], "text/plain");

        let mut no_content = response(StatusCode::NO_CONTENT, "");
        label_response(&plain, &mut no_content);
        assert!(no_content.headers().get(CONTENT_TYPE).is_none());

        let mut empty_error = response(StatusCode::BAD_REQUEST, "");
        label_response(&plain, &mut empty_error);
        assert!(empty_error.headers().get(CONTENT_TYPE).is_none());

        let mut error_body = response(StatusCode::BAD_REQUEST, "bad");
        label_response(&plain, &mut error_body);
        assert_eq!(error_body.headers()[CONTENT_TYPE], "text/plain");

        let mut wildcard = response(StatusCode::OK, "x");
        label_response(&MediaType::parse("text/*").unwrap(), &mut wildcard);
        assert!(wildcard.headers().get(CONTENT_TYPE).is_none());

        let mut preset = response(StatusCode::OK, "x");
        preset
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        label_response(&plain, &mut preset);
        assert_eq!(preset.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_vary_always_added() {
        let mut r = response(StatusCode::NO_CONTENT, "");
        label_response(&MediaType::any(), &mut r);
        let vary: Vec<_> = r.headers().get_all(VARY).iter().collect();
        assert_eq!(vary, vec!["Accept"]);
    }
}
