//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): inbound requests by method, action, status
//! - `gateway_request_duration_seconds` (histogram): inbound latency
//! - `gateway_upstream_outcomes_total` (counter): upstream calls by outcome kind
//! - `gateway_upstream_duration_seconds` (histogram): upstream call latency
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one handled inbound request.
pub fn record_request(method: &str, action: &str, status: u16, start: Instant) {
    let status = status.to_string();
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "action" => action.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    metrics::histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "action" => action.to_string(),
        "status" => status
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of one upstream call.
pub fn record_upstream_outcome(kind: &'static str, start: Instant) {
    metrics::counter!("gateway_upstream_outcomes_total", "outcome" => kind).increment(1);
    metrics::histogram!("gateway_upstream_duration_seconds", "outcome" => kind)
        .record(start.elapsed().as_secs_f64());
}
