//! Endpoints: one template plus its per-method handlers.
//!
//! # Responsibilities
//! - Collect handlers, context values, middleware and nested endpoints
//!   through chained builder calls
//! - Report the methods the endpoint answers (`Allow`)
//! - Dispatch a matched request: slash redirect, method resolution,
//!   context injection, handler call
//!
//! # Design Decisions
//! - The slash check runs before method resolution, so even unsupported
//!   methods are redirected
//! - Resolution order: exact handler, "any" handler, `HEAD` → `GET`,
//!   synthesized `OPTIONS`, else 405
//! - Last registration for a method wins

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::Response;
use tower::{service_fn, Layer, Service};

use crate::error::PatternError;
use crate::http::handler::{self, BoxedHandler, Handler};
use crate::http::middleware::{self, Middleware};
use crate::http::response;
use crate::http::scope::{Scope, ScopeValue};
use crate::routing::method::{allow_list, MethodKind};
use crate::routing::pattern::Pattern;
use crate::routing::router::Route;

/// A route template and everything registered on it.
pub struct Endpoint {
    pattern: Pattern,
    handlers: BTreeMap<MethodKind, BoxedHandler>,
    any: Option<BoxedHandler>,
    context: Vec<(String, ScopeValue)>,
    middleware: Vec<Middleware>,
    children: Vec<Endpoint>,
}

impl Endpoint {
    pub(crate) fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            handlers: BTreeMap::new(),
            any: None,
            context: Vec::new(),
            middleware: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Register `handler` for `method`, replacing any previous one.
    pub fn on<H: Handler>(&mut self, method: MethodKind, handler: H) -> &mut Self {
        self.handlers.insert(method, handler::into_service(handler));
        self
    }

    pub fn get<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.on(MethodKind::Get, handler)
    }

    pub fn head<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.on(MethodKind::Head, handler)
    }

    pub fn post<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.on(MethodKind::Post, handler)
    }

    pub fn put<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.on(MethodKind::Put, handler)
    }

    pub fn patch<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.on(MethodKind::Patch, handler)
    }

    pub fn delete<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.on(MethodKind::Delete, handler)
    }

    pub fn options<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.on(MethodKind::Options, handler)
    }

    /// Register a handler for every method without a more specific one.
    ///
    /// This includes `OPTIONS`: an endpoint with an any handler and no
    /// explicit `OPTIONS` handler passes preflight requests to it instead
    /// of answering 204 itself. `Allow` is still added to the response
    /// when the handler leaves it unset.
    pub fn any<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.any = Some(handler::into_service(handler));
        self
    }

    /// Add a value to the scope of every request this endpoint handles.
    pub fn set_context<T: Any + Send + Sync>(&mut self, name: &str, value: T) -> &mut Self {
        let value: ScopeValue = Arc::new(value);
        match self.context.iter().position(|(key, _)| key == name) {
            Some(index) => self.context[index].1 = value,
            None => self.context.push((name.to_owned(), value)),
        }
        self
    }

    /// Wrap this endpoint (and its nested endpoints) in a middleware layer.
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

    /// Mount a child endpoint under this endpoint's template.
    ///
    /// # Panics
    /// If the joined template is malformed. See [`Endpoint::try_endpoint`].
    pub fn endpoint(&mut self, template: &str) -> &mut Endpoint {
        match self.try_endpoint(template) {
            Ok(child) => child,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_endpoint(&mut self, template: &str) -> Result<&mut Endpoint, PatternError> {
        let pattern = self.pattern.join(template).inspect_err(|err| {
            tracing::error!(error = %err, "rejected nested route template");
        })?;
        let index = self.children.len();
        self.children.push(Endpoint::new(pattern));
        Ok(&mut self.children[index])
    }

    /// Methods this endpoint answers, sorted. Always contains `OPTIONS`;
    /// contains `HEAD` whenever `GET` is registered.
    pub fn methods(&self) -> Vec<MethodKind> {
        let mut methods: BTreeSet<MethodKind> = if self.any.is_some() {
            MethodKind::ALL.into_iter().collect()
        } else {
            self.handlers.keys().copied().collect()
        };
        methods.insert(MethodKind::Options);
        if methods.contains(&MethodKind::Get) {
            methods.insert(MethodKind::Head);
        }
        methods.into_iter().collect()
    }

    /// Flatten this endpoint and its children into routes, depth-first.
    /// `outer` holds ancestor middleware, outermost first.
    pub(crate) fn compile(self, outer: &[Middleware], redirect: StatusCode, routes: &mut Vec<Route>) {
        let methods = self.methods();
        let allow = HeaderValue::from_str(&allow_list(&methods))
            .unwrap_or_else(|_| HeaderValue::from_static("OPTIONS"));

        let dispatch = Arc::new(Dispatch {
            has_wildcard: self.pattern.has_wildcard(),
            has_trailing_slash: self.pattern.has_trailing_slash(),
            handlers: self.handlers,
            any: self.any,
            context: self.context,
            allow,
            redirect,
        });
        let inner = BoxedHandler::new(service_fn(move |req: Request| {
            let dispatch = dispatch.clone();
            async move { Ok::<_, Infallible>(dispatch.call(req).await) }
        }));

        let mut chain = outer.to_vec();
        chain.extend(self.middleware);
        routes.push(Route {
            pattern: self.pattern,
            methods,
            service: middleware::compose(inner, &chain),
        });

        for child in self.children {
            child.compile(&chain, redirect, routes);
        }
    }
}

/// How a request method is answered.
enum Resolution<'a> {
    Handler(&'a BoxedHandler),
    Options,
    MethodNotAllowed,
}

/// The frozen, shareable half of an endpoint.
struct Dispatch {
    has_wildcard: bool,
    has_trailing_slash: bool,
    handlers: BTreeMap<MethodKind, BoxedHandler>,
    any: Option<BoxedHandler>,
    context: Vec<(String, ScopeValue)>,
    allow: HeaderValue,
    redirect: StatusCode,
}

impl Dispatch {
    async fn call(&self, mut req: Request) -> Response {
        if let Some(location) = self.redirect_target(req.uri()) {
            tracing::debug!(from = %req.uri(), to = %location, "redirecting to canonical path");
            return response::redirect(self.redirect, &location);
        }

        let handler = match self.resolve(req.method()) {
            Resolution::Handler(handler) => handler,
            Resolution::Options => return response::options(self.allow.clone()),
            Resolution::MethodNotAllowed => {
                tracing::debug!(method = %req.method(), path = req.uri().path(), "method not allowed");
                return response::method_not_allowed(self.allow.clone());
            }
        };

        self.inject_context(&mut req);
        let is_options = req.method() == Method::OPTIONS;
        let mut res = handler::call(handler, req).await;
        if is_options && !res.headers().contains_key(header::ALLOW) {
            res.headers_mut().insert(header::ALLOW, self.allow.clone());
        }
        res
    }

    /// The canonical location when the request's trailing slash disagrees
    /// with the template. Wildcard templates accept either form.
    fn redirect_target(&self, uri: &Uri) -> Option<String> {
        if self.has_wildcard {
            return None;
        }
        let path = uri.path();
        let canonical = match (self.has_trailing_slash, path.ends_with('/')) {
            (true, false) => format!("{path}/"),
            (false, true) => path[..path.len() - 1].to_owned(),
            _ => return None,
        };
        Some(match uri.query() {
            Some(query) => format!("{canonical}?{query}"),
            None => canonical,
        })
    }

    fn resolve(&self, method: &Method) -> Resolution<'_> {
        let kind = MethodKind::from_method(method);
        if let Some(handler) = kind.and_then(|k| self.handlers.get(&k)) {
            return Resolution::Handler(handler);
        }
        if let Some(handler) = &self.any {
            return Resolution::Handler(handler);
        }
        match kind {
            Some(MethodKind::Head) => self
                .handlers
                .get(&MethodKind::Get)
                .map_or(Resolution::MethodNotAllowed, Resolution::Handler),
            Some(MethodKind::Options) => Resolution::Options,
            _ => Resolution::MethodNotAllowed,
        }
    }

    fn inject_context(&self, req: &mut Request) {
        if self.context.is_empty() {
            return;
        }
        let mut scope = req.extensions().get::<Scope>().cloned().unwrap_or_default();
        for (name, value) in &self.context {
            scope = scope.with_shared(name.as_str(), value.clone());
        }
        req.extensions_mut().insert(scope);
    }
}
