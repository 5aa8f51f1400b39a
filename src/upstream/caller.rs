//! Bounded upstream caller.
//!
//! # Responsibilities
//! - Issue exactly one HTTP request per call (no retries, no fan-out)
//! - Enforce one deadline over connect, send and full body read
//! - Hand the complete body plus declared Content-Type to the classifier
//!
//! # Design Decisions
//! - Uses Tokio's timeout; dropping the future aborts the connection
//! - Bytes already received when the deadline fires are discarded
//! - Upstream HTTP status is logged, never used to pick the outcome

use std::future::Future;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{header, Method};
use tokio::time::timeout;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::classifier::ResponseClassifier;
use crate::upstream::outcome::UpstreamOutcome;

/// Errors raised while building the upstream client at startup.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamSetupError {
    #[error("invalid upstream URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// One outbound call: method, query pairs appended to the upstream URL and an
/// optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamRequest {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl UpstreamRequest {
    pub fn get(query: Vec<(String, String)>) -> Self {
        Self {
            method: Method::GET,
            query,
            body: None,
        }
    }

    pub fn post_json(query: Vec<(String, String)>, body: Bytes) -> Self {
        Self {
            method: Method::POST,
            query,
            body: Some(body),
        }
    }

    /// Value of the first query pair named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Seam between the action router and the network.
pub trait Upstream: Send + Sync {
    /// Perform one call and classify its result.
    fn call(&self, request: UpstreamRequest) -> impl Future<Output = UpstreamOutcome> + Send;
}

/// reqwest-backed caller bound to the configured endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    classifier: ResponseClassifier,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamSetupError> {
        let base_url = Url::parse(&config.url).map_err(|source| UpstreamSetupError::InvalidUrl {
            url: config.url.clone(),
            source,
        })?;

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            timeout: Duration::from_millis(config.timeout_ms),
            classifier: ResponseClassifier::new(config.preview_chars),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn classifier(&self) -> ResponseClassifier {
        self.classifier
    }

    /// Upstream URL with the request's query pairs appended in order.
    pub fn url_for(&self, query: &[(String, String)]) -> Url {
        let mut url = self.base_url.clone();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    async fn fetch(&self, request: UpstreamRequest) -> Result<(u16, Option<String>, String), reqwest::Error> {
        let url = self.url_for(&request.query);
        let mut builder = self
            .http
            .request(request.method, url)
            .header(header::ACCEPT, "application/json, text/plain, */*");

        if let Some(body) = request.body {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response.bytes().await?;

        Ok((status, content_type, String::from_utf8_lossy(&bytes).into_owned()))
    }
}

impl Upstream for UpstreamClient {
    async fn call(&self, request: UpstreamRequest) -> UpstreamOutcome {
        let start = Instant::now();
        let method = request.method.clone();
        let action = request.param("action").unwrap_or("-").to_string();

        let outcome = match timeout(self.timeout, self.fetch(request)).await {
            Ok(Ok((status, content_type, text))) => {
                let outcome = self.classifier.classify(&text, content_type.as_deref());
                tracing::debug!(
                    method = %method,
                    action = %action,
                    upstream_status = status,
                    content_type = content_type.as_deref().unwrap_or("-"),
                    body_len = text.len(),
                    outcome = outcome.kind(),
                    "Upstream responded"
                );
                outcome
            }
            Ok(Err(e)) => {
                tracing::warn!(method = %method, action = %action, error = %e, "Upstream transport error");
                UpstreamOutcome::NetworkError(transport_message(e))
            }
            Err(_) => {
                tracing::warn!(
                    method = %method,
                    action = %action,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Upstream call timed out"
                );
                UpstreamOutcome::TimedOut
            }
        };

        metrics::record_upstream_outcome(outcome.kind(), start);
        outcome
    }
}

/// reqwest's Display includes the full URL, which carries the upstream
/// deployment id. Strip it before the message can reach a caller.
fn transport_message(error: reqwest::Error) -> String {
    error.without_url().to_string()
}
