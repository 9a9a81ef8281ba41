//! Response header handling.
//!
//! # Responsibilities
//! - Merge `Vary` values without duplicating what the handler set
//! - Apply the no-cache header set for routes that disable caching
//! - Turn a `GET` response into a `HEAD` response
//!
//! # Design Decisions
//! - Headers set by the handler are never overwritten
//! - `Vary` is compared case-insensitively; `*` already covers any field
//! - Body size is read from `size_hint`, the body is never buffered

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_LENGTH, EXPIRES, PRAGMA, VARY};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use http_body::Body as _;

/// Add `field` to `Vary` unless an existing value already covers it.
pub fn merge_vary(headers: &mut HeaderMap, field: &'static str) {
    let covered = headers
        .get_all(VARY)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|existing| existing == "*" || existing.eq_ignore_ascii_case(field));

    if !covered {
        headers.append(VARY, HeaderValue::from_static(field));
    }
}

/// True when the body is known to hold zero bytes.
pub fn body_is_empty(body: &Body) -> bool {
    body.size_hint().exact() == Some(0)
}

/// `Cache-Control`, `Pragma` and `Expires` forbidding client caching.
pub fn apply_no_cache(headers: &mut HeaderMap) {
    let no_cache: [(HeaderName, &'static str); 3] = [
        (CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        (PRAGMA, "no-cache"),
        (EXPIRES, "0"),
    ];
    for (name, value) in no_cache {
        if !headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
}

/// Drop the body, keeping headers. `Content-Length` is filled in from the
/// body size when known and not already present.
pub fn strip_body_for_head(response: Response) -> Response {
    let (mut parts, body) = response.into_parts();
    if !parts.headers.contains_key(CONTENT_LENGTH) {
        if let Some(len) = body.size_hint().exact() {
            parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        }
    }
    Response::from_parts(parts, Body::empty())
}
