//! Setup-time error types.
//!
//! Request-time outcomes (not found, method not allowed, redirects) are
//! plain responses and never show up here.

use thiserror::Error;

/// A route template that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("route template must not be empty")]
    Empty,

    #[error("route template `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    #[error("route template `{template}` has a `:` without a parameter name in segment `{segment}`")]
    EmptyParameterName { template: String, segment: String },

    #[error("route template `{template}` declares parameter `{name}` more than once")]
    DuplicateParameter { template: String, name: String },

    #[error("route template `{0}` uses `*` before its final segment")]
    MisplacedWildcard(String),

    #[error("cannot nest `{child}` under wildcard route `{parent}`")]
    NestedUnderWildcard { parent: String, child: String },
}

/// A method name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown HTTP method `{0}`")]
pub struct UnknownMethod(pub String);
