//! Route registration and top-level dispatch.
//!
//! # Responsibilities
//! - Collect endpoints in registration order, plus root middleware
//! - Freeze into a [`RouterService`] that normalizes the path, finds the
//!   first matching route and hands the request to its endpoint
//!
//! # Design Decisions
//! - First match wins; there is no specificity ranking
//! - Setup and serving are separate types: `Router` is mutable,
//!   `RouterService` is immutable and cheap to clone
//! - Root middleware wraps the routing step, so it also sees 404s
//! - Captures are appended to any `Scope` already on the request

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tower::{service_fn, Layer, Service, ServiceExt};

use crate::config::RouterConfig;
use crate::error::PatternError;
use crate::http::handler::{self, BoxedHandler};
use crate::http::middleware::{self, Middleware};
use crate::http::response;
use crate::http::scope::Scope;
use crate::routing::endpoint::Endpoint;
use crate::routing::method::MethodKind;
use crate::routing::pattern::{Params, Pattern};

/// Router under construction.
pub struct Router {
    endpoints: Vec<Endpoint>,
    middleware: Vec<Middleware>,
    redirect: StatusCode,
}

impl Router {
    pub fn new() -> Self {
        Self::with_config(&RouterConfig::default())
    }

    pub fn with_config(config: &RouterConfig) -> Self {
        Self {
            endpoints: Vec::new(),
            middleware: Vec::new(),
            redirect: config.redirect_status.status_code(),
        }
    }

    /// Register an endpoint. Earlier endpoints take priority.
    ///
    /// # Panics
    /// If `template` is malformed. Templates are compiled during setup, so
    /// this fails at startup rather than at request time. Use
    /// [`Router::try_endpoint`] to handle the error instead.
    pub fn endpoint(&mut self, template: &str) -> &mut Endpoint {
        match self.try_endpoint(template) {
            Ok(endpoint) => endpoint,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_endpoint(&mut self, template: &str) -> Result<&mut Endpoint, PatternError> {
        let pattern = Pattern::parse(template).inspect_err(|err| {
            tracing::error!(error = %err, "rejected route template");
        })?;
        let index = self.endpoints.len();
        self.endpoints.push(Endpoint::new(pattern));
        Ok(&mut self.endpoints[index])
    }

    /// Wrap the whole router in a middleware layer. The first layer
    /// registered is the outermost.
    pub fn layer<L>(&mut self, layer: L) -> &mut Self
    where
        L: Layer<BoxedHandler> + Send + Sync + 'static,
        L::Service: Service<Request, Response = Response, Error = Infallible>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.middleware.push(Middleware::from_layer(layer));
        self
    }

    /// Freeze the router for serving.
    pub fn into_service(self) -> RouterService {
        let mut routes = Vec::new();
        for endpoint in self.endpoints {
            endpoint.compile(&[], self.redirect, &mut routes);
        }
        tracing::info!(routes = routes.len(), middleware = self.middleware.len(), "router ready");

        let table = Arc::new(RouteTable { routes });
        let routing = {
            let table = table.clone();
            BoxedHandler::new(service_fn(move |req: Request| {
                let table = table.clone();
                async move { Ok::<_, Infallible>(table.dispatch(req).await) }
            }))
        };

        RouterService {
            table,
            chain: middleware::compose(routing, &self.middleware),
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// A compiled endpoint with its middleware chain applied.
pub(crate) struct Route {
    pub(crate) pattern: Pattern,
    pub(crate) methods: Vec<MethodKind>,
    pub(crate) service: BoxedHandler,
}

struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    fn find(&self, path: &str) -> Option<(&Route, Params)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    async fn dispatch(&self, mut req: Request) -> Response {
        let path = normalize(req.uri().path());
        let Some((route, params)) = self.find(path) else {
            tracing::trace!(path, "no route matched");
            return response::not_found();
        };
        tracing::debug!(pattern = %route.pattern, path, "route matched");

        let mut scope = req.extensions().get::<Scope>().cloned().unwrap_or_default();
        for (name, value) in params {
            scope = scope.with(name, value);
        }
        req.extensions_mut().insert(scope);

        handler::call(&route.service, req).await
    }
}

/// Strip a single trailing slash, keeping the root as `/`.
pub fn normalize(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}

/// Result of [`RouterService::find`].
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub pattern: &'a Pattern,
    pub methods: &'a [MethodKind],
    pub params: Params,
}

/// A frozen router, usable as a `tower::Service`.
///
/// Mount it in axum with `axum::Router::new().fallback_service(service)`.
#[derive(Clone)]
pub struct RouterService {
    table: Arc<RouteTable>,
    chain: BoxedHandler,
}

impl RouterService {
    /// Run only the match step for `path`.
    pub fn find(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.table
            .find(normalize(path))
            .map(|(route, params)| RouteMatch {
                pattern: &route.pattern,
                methods: &route.methods,
                params,
            })
    }

    /// Compiled routes in match order.
    pub fn routes(&self) -> impl Iterator<Item = (&Pattern, &[MethodKind])> {
        self.table
            .routes
            .iter()
            .map(|route| (&route.pattern, route.methods.as_slice()))
    }
}

impl Service<Request> for RouterService {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        self.chain.clone().oneshot(req).boxed()
    }
}
