//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, preview length > 0)
//! - Check the upstream URL and listener address parse
//! - Check allow-listed origins are bare `scheme://host[:port]` values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `upstream.url`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a fully assembled configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.url.trim().is_empty() {
        errors.push(ValidationError::new("upstream.url", "is required"));
    } else {
        match Url::parse(&config.upstream.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                "upstream.url",
                format!("unsupported scheme '{}'", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new("upstream.url", e.to_string())),
        }
    }

    if config.upstream.timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.timeout_ms", "must be greater than 0"));
    }

    if config.upstream.preview_chars == 0 {
        errors.push(ValidationError::new("upstream.preview_chars", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    } else if config.timeouts.request_secs.saturating_mul(1_000) <= config.upstream.timeout_ms {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must exceed upstream.timeout_ms so upstream timeouts are reported, not cut off",
        ));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    for origin in &config.access.allowed_origins {
        if !is_bare_origin(origin) {
            errors.push(ValidationError::new(
                "access.allowed_origins",
                format!("'{}' is not a scheme://host[:port] origin", origin),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Origins are compared byte-for-byte against the `Origin` header, which never
/// carries a path, query or trailing slash.
fn is_bare_origin(origin: &str) -> bool {
    let Ok(url) = Url::parse(origin) else {
        return false;
    };
    url.host_str().is_some()
        && !origin.ends_with('/')
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none()
}
