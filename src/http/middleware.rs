//! Middleware composition.
//!
//! # Responsibilities
//! - Accept any `tower::Layer` over [`BoxedHandler`] (including
//!   `axum::middleware::from_fn` and `tower-http` layers)
//! - Fold a middleware list around an inner service
//!
//! # Design Decisions
//! - The first registered middleware ends up outermost: it sees the
//!   request first and the response last
//! - Layers are type-erased once at registration so the chain can be
//!   rebuilt for every endpoint without generics leaking into the router

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;
use tower::util::BoxCloneSyncService;
use tower::{Layer, Service};

use crate::http::handler::BoxedHandler;

/// A type-erased layer.
#[derive(Clone)]
pub struct Middleware {
    wrap: Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync>,
}

impl Middleware {
    pub fn from_layer<L>(layer: L) -> Self
    where
        L: Layer<BoxedHandler> + Send + Sync + 'static,
        L::Service: Service<Request, Response = Response, Error = Infallible>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        Self {
            wrap: Arc::new(move |inner: BoxedHandler| {
                BoxCloneSyncService::new(layer.layer(inner))
            }),
        }
    }

    fn apply(&self, inner: BoxedHandler) -> BoxedHandler {
        (self.wrap)(inner)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware").finish_non_exhaustive()
    }
}

/// Wrap `inner` so that `chain[0]` is the outermost layer.
pub(crate) fn compose(inner: BoxedHandler, chain: &[Middleware]) -> BoxedHandler {
    chain.iter().rev().fold(inner, |service, middleware| middleware.apply(service))
}
