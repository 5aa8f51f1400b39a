//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the booking gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream endpoint every action is forwarded to.
    pub upstream: UpstreamConfig,

    /// Cross-origin access policy.
    pub access: AccessConfig,

    /// Action routing policy.
    pub routing: RoutingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full upstream URL, e.g. a deployed script's `/exec` endpoint.
    /// Has no default; must come from the config file or environment.
    pub url: String,

    /// Hard bound for one upstream call, body included, in milliseconds.
    pub timeout_ms: u64,

    /// Maximum characters of raw upstream text echoed in diagnostics.
    pub preview_chars: usize,

    /// Honour HTTP(S)_PROXY / NO_PROXY from the environment.
    pub use_system_proxy: bool,

    /// User agent sent upstream.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_ms: 7_000,
            preview_chars: 500,
            use_system_proxy: true,
            user_agent: concat!("booking-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Cross-origin access configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Origins echoed back verbatim. Anything else gets `*`.
    pub allowed_origins: Vec<String>,

    /// Value list for `Access-Control-Allow-Headers`.
    pub allow_headers: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_headers: vec![
                "Content-Type".to_string(),
                "Authorization".to_string(),
                "Idempotency-Key".to_string(),
            ],
        }
    }
}

/// Action routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Forward GET requests with an unknown (or no) action upstream.
    /// When false they are answered with 404 `unknown action`.
    pub passthrough_unknown_actions: bool,

    /// Treat a non-empty plain-text cancel response as a confirmation.
    pub trust_plain_text_cancel: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            passthrough_unknown_actions: true,
            trust_plain_text_cancel: true,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 15 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 64 * 1024, // 64KB
        }
    }
}
