//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Status used for trailing-slash redirects.
    pub redirect_status: RedirectStatus,

    /// Logging settings.
    pub logging: LoggingConfig,

    /// Declarative route table (used by `route-check`).
    pub routes: Vec<RouteConfig>,
}

/// Permanent redirect flavour for slash canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectStatus {
    /// 301; clients may rewrite the method to `GET`.
    MovedPermanently,

    /// 308; method and body are preserved.
    #[default]
    PermanentRedirect,
}

impl RedirectStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            RedirectStatus::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
            RedirectStatus::PermanentRedirect => StatusCode::PERMANENT_REDIRECT,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "path_router=info".to_string(),
        }
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging and CLI output.
    pub name: String,

    /// Route template (`/users/:id`).
    pub pattern: String,

    /// Method names; `ANY` registers the catch-all handler.
    #[serde(default)]
    pub methods: Vec<String>,

    /// String values added to the request scope.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
}

/// Method name that maps to the catch-all handler.
pub const ANY_METHOD: &str = "ANY";
