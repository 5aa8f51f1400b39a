//! Booking Gateway Library
//!
//! A stateless gateway in front of one unreliable booking upstream. Every
//! inbound action becomes at most one upstream call, and every upstream
//! answer (JSON, JSON wrapped in noise, plain text, HTML error page, timeout)
//! is normalised into one stable outward contract.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
