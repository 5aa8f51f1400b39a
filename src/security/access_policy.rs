//! Cross-origin access policy.
//!
//! # Responsibilities
//! - Decide which `Access-Control-Allow-Origin` value each request gets
//! - Emit the fixed allow-methods / allow-headers on every response
//! - Answer preflight (`OPTIONS`) requests before they reach the router
//!
//! # Design Decisions
//! - Exact, case-sensitive origin match against a static allow-list
//! - Unlisted origins get `*` rather than a rejection so preview deployments
//!   of the booking page keep working
//! - Echoed origins add `Vary: Origin` so caches keep them apart

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::AccessConfig;

pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";

/// Result of evaluating one request against the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub allow_origin: HeaderValue,
    /// True when the request's own origin is echoed back.
    pub echoed: bool,
    pub is_preflight: bool,
}

/// Static allow-list plus the header values emitted on every response.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    allowed_origins: Vec<String>,
    allow_headers: HeaderValue,
}

impl AccessPolicy {
    pub fn new(allowed_origins: Vec<String>, allow_headers: &[String]) -> Self {
        let allow_headers = HeaderValue::from_str(&allow_headers.join(", "))
            .unwrap_or_else(|_| HeaderValue::from_static("Content-Type"));
        Self {
            allowed_origins,
            allow_headers,
        }
    }

    pub fn from_config(config: &AccessConfig) -> Self {
        Self::new(config.allowed_origins.clone(), &config.allow_headers)
    }

    /// Evaluate the request's method and `Origin` header.
    pub fn decide(&self, method: &Method, origin: Option<&str>) -> AccessDecision {
        let listed = origin
            .filter(|o| self.allowed_origins.iter().any(|allowed| allowed == o))
            .and_then(|o| HeaderValue::from_str(o).ok());

        AccessDecision {
            echoed: listed.is_some(),
            allow_origin: listed.unwrap_or_else(|| HeaderValue::from_static("*")),
            is_preflight: method == Method::OPTIONS,
        }
    }

    /// Write the cross-origin headers for `decision` into `headers`.
    pub fn apply(&self, decision: &AccessDecision, headers: &mut HeaderMap) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, decision.allow_origin.clone());
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        if decision.echoed {
            headers.append(header::VARY, HeaderValue::from_static("Origin"));
        }
    }
}

/// Applies the policy to every response and short-circuits preflight.
pub async fn access_policy_middleware(
    State(policy): State<Arc<AccessPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());
    let decision = policy.decide(request.method(), origin);

    let mut response = if decision.is_preflight {
        tracing::debug!(origin = origin.unwrap_or("-"), "Preflight answered");
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    policy.apply(&decision, response.headers_mut());
    response
}
