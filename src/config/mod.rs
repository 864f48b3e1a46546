//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, template compilation)
//!     → RouterConfig (validated, immutable)
//!     → Router::with_config / route-check
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - No hot reload: a router is frozen once serving starts

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{LoggingConfig, RedirectStatus, RouteConfig, RouterConfig};
pub use validation::ValidationError;
