//! Responses produced by the router itself.
//!
//! # Responsibilities
//! - 404 when no route matches
//! - 405 when a route matches but no handler answers the method
//! - 204 with `Allow` for synthesized `OPTIONS`
//! - Permanent redirects for trailing-slash canonicalization
//!
//! # Design Decisions
//! - Bodies are always empty; everything else belongs to handlers

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;

fn empty(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

pub fn not_found() -> Response {
    empty(StatusCode::NOT_FOUND)
}

pub fn method_not_allowed(allow: HeaderValue) -> Response {
    let mut response = empty(StatusCode::METHOD_NOT_ALLOWED);
    response.headers_mut().insert(header::ALLOW, allow);
    response
}

pub fn options(allow: HeaderValue) -> Response {
    let mut response = empty(StatusCode::NO_CONTENT);
    response.headers_mut().insert(header::ALLOW, allow);
    response
}

/// A redirect to `location`. Falls back to 404 if the location cannot be
/// carried in a header.
pub fn redirect(status: StatusCode, location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = empty(status);
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => {
            tracing::warn!(location, "redirect location is not a valid header value");
            not_found()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_sets_allow() {
        let res = options(HeaderValue::from_static("GET, HEAD, OPTIONS"));
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert_eq!(res.headers()[header::ALLOW], "GET, HEAD, OPTIONS");
    }

    #[test]
    fn test_redirect_sets_location() {
        let res = redirect(StatusCode::PERMANENT_REDIRECT, "/a?x=1");
        assert_eq!(res.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/a?x=1");
    }

    #[test]
    fn test_not_found_is_empty() {
        let res = not_found();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().is_empty());
    }
}
