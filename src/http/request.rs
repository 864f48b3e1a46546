//! Parameter accessors on incoming requests.
//!
//! # Responsibilities
//! - Read path captures and endpoint context values from the request scope
//! - Read query string values
//! - Let middleware add values for downstream handlers
//!
//! # Design Decisions
//! - Exposed as an extension trait on `http::Request` so handlers keep
//!   working with plain axum types
//! - Query values are form-decoded; the first occurrence of a key wins

use std::any::Any;

use axum::http::Request;

use crate::http::scope::Scope;

/// Scope and query access for requests that went through the router.
pub trait RequestScopeExt {
    /// The scope attached by the router, if any.
    fn scope(&self) -> Option<&Scope>;

    /// A captured path parameter (or a `String` context value).
    fn path_param(&self, name: &str) -> Option<&str>;

    /// A context value of type `T`.
    fn context_param<T: Any + Send + Sync>(&self, name: &str) -> Option<&T>;

    /// A decoded query string value.
    fn query_param(&self, name: &str) -> Option<String>;

    /// Push `name = value` onto the request scope.
    fn with_context_param<T: Any + Send + Sync>(self, name: &str, value: T) -> Self
    where
        Self: Sized;
}

impl<B> RequestScopeExt for Request<B> {
    fn scope(&self) -> Option<&Scope> {
        self.extensions().get::<Scope>()
    }

    fn path_param(&self, name: &str) -> Option<&str> {
        self.scope()?.param(name)
    }

    fn context_param<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.scope()?.get::<T>(name)
    }

    fn query_param(&self, name: &str) -> Option<String> {
        let query = self.uri().query()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    fn with_context_param<T: Any + Send + Sync>(mut self, name: &str, value: T) -> Self {
        let scope = self.scope().cloned().unwrap_or_default().with(name, value);
        self.extensions_mut().insert(scope);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_path_param() {
        let mut req = request("/");
        req.extensions_mut()
            .insert(Scope::new().with("key", "value".to_string()));
        assert_eq!(req.path_param("key"), Some("value"));
        assert_eq!(req.path_param("missing"), None);
    }

    #[test]
    fn test_no_scope() {
        let req = request("/");
        assert!(req.scope().is_none());
        assert_eq!(req.path_param("key"), None);
        assert_eq!(req.context_param::<i32>("key"), None);
    }

    #[test]
    fn test_query_param() {
        let req = request("/?key=value");
        assert_eq!(req.query_param("key").as_deref(), Some("value"));
        assert_eq!(req.query_param("other"), None);
    }

    #[test]
    fn test_query_param_decodes_and_takes_first() {
        let req = request("/search?q=a%20b&q=second&plus=x+y");
        assert_eq!(req.query_param("q").as_deref(), Some("a b"));
        assert_eq!(req.query_param("plus").as_deref(), Some("x y"));
        assert_eq!(request("/").query_param("q"), None);
    }

    #[test]
    fn test_with_context_param_extends_existing_scope() {
        let mut req = request("/");
        req.extensions_mut()
            .insert(Scope::new().with("id", "7".to_string()));

        let req = req.with_context_param("foo", 123_i32);
        assert_eq!(req.context_param::<i32>("foo"), Some(&123));
        assert_eq!(req.path_param("id"), Some("7"));
    }
}
