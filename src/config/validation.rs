//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every route template so bad ones fail at load time
//! - Check method names and route names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{RouterConfig, ANY_METHOD};
use crate::error::{PatternError, UnknownMethod};
use crate::routing::method::MethodKind;
use crate::routing::pattern::Pattern;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("route name `{0}` is used more than once")]
    DuplicateName(String),

    #[error("route `{route}`: {source}")]
    Pattern {
        route: String,
        #[source]
        source: PatternError,
    },

    #[error("route `{route}`: {source}")]
    Method {
        route: String,
        #[source]
        source: UnknownMethod,
    },
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !names.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateName(route.name.clone()));
        }

        if let Err(source) = Pattern::parse(&route.pattern) {
            errors.push(ValidationError::Pattern {
                route: route.name.clone(),
                source,
            });
        }

        for method in &route.methods {
            if method.eq_ignore_ascii_case(ANY_METHOD) {
                continue;
            }
            if let Err(source) = method.parse::<MethodKind>() {
                errors.push(ValidationError::Method {
                    route: route.name.clone(),
                    source,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    fn route(name: &str, pattern: &str, methods: &[&str]) -> RouteConfig {
        RouteConfig {
            name: name.to_string(),
            pattern: pattern.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            context: Default::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = RouterConfig {
            routes: vec![
                route("root", "/", &["GET"]),
                route("files", "/files/*", &["any"]),
            ],
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = RouterConfig {
            routes: vec![
                route("a", "/a/:", &["GET"]),
                route("a", "/b", &["FETCH"]),
                route(" ", "/c", &[]),
            ],
            ..Default::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::Pattern { .. }));
        assert_eq!(errors[1], ValidationError::DuplicateName("a".into()));
        assert!(matches!(errors[2], ValidationError::Method { .. }));
        assert_eq!(errors[3], ValidationError::EmptyName { index: 2 });
    }
}
