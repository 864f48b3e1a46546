//! Request handlers.
//!
//! A handler is any cloneable async function from [`Request`] to something
//! that implements [`IntoResponse`]. Handlers are boxed into a
//! [`BoxedHandler`] service at registration time so that endpoints can store
//! them uniformly and middleware can wrap them.

use std::convert::Infallible;
use std::future::Future;

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tower::util::BoxCloneSyncService;
use tower::{service_fn, ServiceExt};

/// The type-erased service every handler, endpoint and middleware chain
/// is stored as.
pub type BoxedHandler = BoxCloneSyncService<Request, Response, Infallible>;

/// An async request handler.
pub trait Handler: Clone + Send + Sync + 'static {
    fn call(self, req: Request) -> BoxFuture<'static, Response>;
}

impl<F, Fut, R> Handler for F
where
    F: FnOnce(Request) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + 'static,
{
    fn call(self, req: Request) -> BoxFuture<'static, Response> {
        self(req).map(IntoResponse::into_response).boxed()
    }
}

/// Box a handler as a service.
pub fn into_service<H: Handler>(handler: H) -> BoxedHandler {
    BoxCloneSyncService::new(service_fn(move |req: Request| {
        handler.clone().call(req).map(Ok::<_, Infallible>)
    }))
}

/// Drive a boxed service to completion. The error type is uninhabited.
pub(crate) async fn call(service: &BoxedHandler, req: Request) -> Response {
    service
        .clone()
        .oneshot(req)
        .await
        .unwrap_or_else(|never| match never {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_closure_handler() {
        let service = into_service(|_req: Request| async { (StatusCode::CREATED, "made") });
        let res = call(&service, Request::new(Body::empty())).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_unit_handler_is_ok() {
        let service = into_service(|_req: Request| async {});
        let res = call(&service, Request::new(Body::empty())).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_handler_runs_once_per_call() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let service = into_service(move |_req: Request| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        call(&service, Request::new(Body::empty())).await;
        call(&service, Request::new(Body::empty())).await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
