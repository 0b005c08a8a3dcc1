//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, hostnames non-empty)
//! - Check upstream routes are well-formed and unique
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::fmt;

use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyHostname,
    ZeroTimeout,
    RoutePath(String),
    RouteUrl { path: String, url: String },
    DuplicateRoute(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyHostname => write!(f, "listen.hostname must not be empty"),
            ValidationError::ZeroTimeout => write!(f, "upstream.timeout_secs must be greater than 0"),
            ValidationError::RoutePath(path) => {
                write!(f, "route path '{}' must start with '/'", path)
            }
            ValidationError::RouteUrl { path, url } => {
                write!(f, "route '{}' has invalid upstream URL '{}'", path, url)
            }
            ValidationError::DuplicateRoute(path) => write!(f, "route '{}' is defined twice", path),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check an application configuration, collecting every problem.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listen.hostname.trim().is_empty() {
        errors.push(ValidationError::EmptyHostname);
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let mut seen = HashSet::new();
    for route in &config.upstream.routes {
        if !route.path.starts_with('/') {
            errors.push(ValidationError::RoutePath(route.path.clone()));
        }

        let url_ok = Url::parse(&route.url)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .unwrap_or(false);
        if !url_ok {
            errors.push(ValidationError::RouteUrl {
                path: route.path.clone(),
                url: route.url.clone(),
            });
        }

        if !seen.insert(route.path.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
