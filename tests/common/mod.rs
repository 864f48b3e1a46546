//! Shared utilities for integration testing.

use axum::body::{self, Body};
use axum::extract::Request;
use axum::response::Response;
use path_router::RouterService;
use tower::ServiceExt;

/// Dispatch a bodiless request through the router.
pub async fn send(service: &RouterService, method: &str, uri: &str) -> Response {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    service.clone().oneshot(req).await.unwrap()
}

/// A response header as a string, if present.
#[allow(dead_code)]
pub fn header<'a>(res: &'a Response, name: &str) -> Option<&'a str> {
    res.headers()
        .get(name)
        .map(|value| value.to_str().unwrap())
}

/// Collect a response body as UTF-8 text.
#[allow(dead_code)]
pub async fn text(res: Response) -> String {
    let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
