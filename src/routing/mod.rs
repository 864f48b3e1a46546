//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     Router::endpoint(template)
//!     → pattern.rs (parse template into segments)
//!     → endpoint.rs (handlers, context, middleware, nested endpoints)
//!     → Router::into_service (flatten depth-first, apply middleware)
//!     → Freeze as immutable RouterService
//!
//! Incoming Request (method, path):
//!     → router.rs (strip one trailing slash, first matching route)
//!     → endpoint.rs (slash redirect, method resolution, context)
//!     → handler
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex: templates are matched segment by segment
//! - Deterministic: first registered match wins

pub mod endpoint;
pub mod method;
pub mod pattern;
pub mod router;

pub use endpoint::Endpoint;
pub use method::MethodKind;
pub use pattern::{Params, Pattern};
pub use router::{RouteMatch, Router, RouterService};
