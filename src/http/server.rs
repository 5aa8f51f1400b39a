//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, access policy, timeout, body limit)
//! - Bind server to listener
//! - Hand every `/api` request to the action router

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, Method, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::request::{request_id, InboundRequest, MakeRequestUuid, X_REQUEST_ID};
use crate::observability::metrics;
use crate::routing::{actions, ActionRouter, RoutePolicy};
use crate::security::{access_policy_middleware, AccessPolicy};
use crate::upstream::{UpstreamClient, UpstreamSetupError};

/// Errors that stop the server from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Upstream(#[from] UpstreamSetupError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ActionRouter<UpstreamClient>>,
}

/// HTTP server for the booking gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        let state = AppState {
            router: Arc::new(ActionRouter::new(upstream, RoutePolicy::from_config(&config))),
        };
        let policy = Arc::new(AccessPolicy::from_config(&config.access));

        let router = Self::build_router(&config, state, policy);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, policy: Arc<AccessPolicy>) -> Router {
        Router::new()
            .route("/api", any(gateway_handler))
            .route("/api/", any(gateway_handler))
            .route("/", get(status_handler))
            .route("/health", get(status_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
                    .layer(middleware::from_fn_with_state(policy, access_policy_middleware))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream_timeout_ms = self.config.upstream.timeout_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// The assembled router, for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Action endpoint: parse once, route once, respond once.
async fn gateway_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);
    let request = InboundRequest::from_parts(method, &uri, &headers, body);

    // Known names only, to keep the metric label set bounded.
    let action_label = match request.method {
        Method::POST => actions::create_action().name,
        _ => actions::lookup_get(request.action.as_deref()).map_or("other", |spec| spec.name),
    };

    tracing::debug!(
        request_id = %request_id,
        method = %request.method,
        action = request.action.as_deref().unwrap_or("-"),
        "Routing request"
    );

    let response = state.router.route(&request).await;

    tracing::info!(
        request_id = %request_id,
        method = %request.method,
        action = action_label,
        status = response.status.as_u16(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Request handled"
    );
    metrics::record_request(request.method.as_str(), action_label, response.status.as_u16(), start_time);

    response.into_response()
}

async fn status_handler() -> Json<Value> {
    Json(json!({
        "ok": true,
        "msg": "booking gateway running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
