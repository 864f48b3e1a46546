//! The closed set of methods an endpoint can register handlers for.

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::error::UnknownMethod;

/// A registrable HTTP method.
///
/// Variants are declared in lexicographic order so that sorted sets of
/// kinds render as a sorted `Allow` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MethodKind {
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
}

impl MethodKind {
    /// Every kind, in `Allow` order.
    pub const ALL: [MethodKind; 7] = [
        MethodKind::Delete,
        MethodKind::Get,
        MethodKind::Head,
        MethodKind::Options,
        MethodKind::Patch,
        MethodKind::Post,
        MethodKind::Put,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MethodKind::Delete => "DELETE",
            MethodKind::Get => "GET",
            MethodKind::Head => "HEAD",
            MethodKind::Options => "OPTIONS",
            MethodKind::Patch => "PATCH",
            MethodKind::Post => "POST",
            MethodKind::Put => "PUT",
        }
    }

    /// Map a request method onto the closed set.
    /// Extension methods and `CONNECT`/`TRACE` return `None`.
    pub fn from_method(method: &Method) -> Option<Self> {
        MethodKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == method.as_str())
    }
}

impl From<MethodKind> for Method {
    fn from(kind: MethodKind) -> Self {
        match kind {
            MethodKind::Delete => Method::DELETE,
            MethodKind::Get => Method::GET,
            MethodKind::Head => Method::HEAD,
            MethodKind::Options => Method::OPTIONS,
            MethodKind::Patch => Method::PATCH,
            MethodKind::Post => Method::POST,
            MethodKind::Put => Method::PUT,
        }
    }
}

impl FromStr for MethodKind {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MethodKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMethod(s.to_owned()))
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render kinds as an `Allow` header value (`GET, HEAD, OPTIONS`).
pub fn allow_list(methods: &[MethodKind]) -> String {
    methods
        .iter()
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
