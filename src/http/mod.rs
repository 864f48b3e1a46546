//! HTTP plumbing shared by the routing layer.
//!
//! # Data Flow
//! ```text
//! Request
//!     → middleware.rs (root layers, outermost first)
//!     → routing (match, attach Scope with captures)
//!     → middleware.rs (endpoint layers)
//!     → handler.rs (boxed handler) or response.rs (404/405/204/redirect)
//!
//! Handlers read captures through request.rs (RequestScopeExt → scope.rs)
//! ```

pub mod handler;
pub mod middleware;
pub mod request;
pub mod response;
pub mod scope;

pub use handler::{BoxedHandler, Handler};
pub use middleware::Middleware;
pub use request::RequestScopeExt;
pub use scope::{Scope, ScopeValue};
