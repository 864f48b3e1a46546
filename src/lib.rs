//! Path-template HTTP router.
//!
//! Templates are made of `/`-separated segments. A segment may contain
//! literal text and `:name` parameters (`/files/:name.:ext`), and the last
//! segment may be `*` to accept any remaining path.
//!
//! ```no_run
//! use axum::extract::Request;
//! use path_router::{RequestScopeExt, Router};
//!
//! # async fn run() -> std::io::Result<()> {
//! let mut router = Router::new();
//! router.endpoint("/users/:id").get(|req: Request| async move {
//!     format!("user {}", req.path_param("id").unwrap_or_default())
//! });
//!
//! let app = axum::Router::new().fallback_service(router.into_service());
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use error::{PatternError, UnknownMethod};
pub use http::{Middleware, RequestScopeExt, Scope};
pub use routing::{Endpoint, MethodKind, Params, Pattern, RouteMatch, Router, RouterService};
