//! Action routing.
//!
//! # Responsibilities
//! - Map (method, action) to at most one upstream call
//! - Validate required fields before any call is made
//! - Shape the single outward response (JSON envelope or HTML fragment)
//!
//! # State Machine
//! ```text
//! OPTIONS                → 200 empty, no call
//! GET  known action      → validate → call → shape per ResponseMode
//! GET  unknown / none    → passthrough call, or 404 when disabled
//! POST                   → validate body → call action=create
//! anything else          → 405
//! ```
//!
//! # Design Decisions
//! - Validation failures are 400, upstream failures 502, regardless of what
//!   status the upstream itself answered with
//! - Raw upstream text is only echoed through `bounded_preview`

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use serde_json::{json, Map, Value};

use crate::config::{GatewayConfig, RoutingConfig};
use crate::http::request::InboundRequest;
use crate::http::response::OutwardResponse;
use crate::routing::actions::{self, ActionSpec, BodyMode, ResponseMode};
use crate::upstream::preview::{bounded_preview, truncate_chars, DEFAULT_PREVIEW_CHARS};
use crate::upstream::{Upstream, UpstreamOutcome, UpstreamRequest};

pub const CANCEL_SUCCESS: &str = "Your booking has been cancelled.";
pub const CANCEL_FAILURE: &str = "We could not cancel your booking. Please try again or contact us.";

/// Router policy knobs, taken from configuration at startup.
#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    pub passthrough_unknown_actions: bool,
    pub trust_plain_text_cancel: bool,
    pub preview_chars: usize,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self::from_routing(&RoutingConfig::default(), DEFAULT_PREVIEW_CHARS)
    }
}

impl RoutePolicy {
    pub fn from_routing(routing: &RoutingConfig, preview_chars: usize) -> Self {
        Self {
            passthrough_unknown_actions: routing.passthrough_unknown_actions,
            trust_plain_text_cancel: routing.trust_plain_text_cancel,
            preview_chars,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::from_routing(&config.routing, config.upstream.preview_chars)
    }
}

/// Routes inbound requests to the upstream through `U`.
pub struct ActionRouter<U> {
    upstream: U,
    policy: RoutePolicy,
}

impl<U: Upstream> ActionRouter<U> {
    pub fn new(upstream: U, policy: RoutePolicy) -> Self {
        Self { upstream, policy }
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// Produce the outward response for one inbound request.
    pub async fn route(&self, request: &InboundRequest) -> OutwardResponse {
        match request.method {
            Method::OPTIONS => OutwardResponse::empty(StatusCode::OK),
            Method::GET => self.route_get(request).await,
            Method::POST => self.route_post(request).await,
            _ => OutwardResponse::json_error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed"),
        }
    }

    async fn route_get(&self, request: &InboundRequest) -> OutwardResponse {
        let Some(spec) = actions::lookup_get(request.action.as_deref()) else {
            return self.passthrough(request).await;
        };

        if let Some(field) = first_missing_param(spec, request) {
            tracing::debug!(action = spec.name, field, "Missing required field");
            let message = format!("missing required field {}", field);
            return match spec.response_mode {
                ResponseMode::RenderedFragment => {
                    OutwardResponse::fragment(StatusCode::BAD_REQUEST, &format!("Cannot cancel: {}.", message))
                }
                _ => OutwardResponse::json_error(StatusCode::BAD_REQUEST, message),
            };
        }

        let outcome = self.upstream.call(upstream_get(spec, request)).await;

        match spec.response_mode {
            ResponseMode::JsonPassthrough => self.json_passthrough(outcome),
            ResponseMode::RenderedFragment => self.cancel_fragment(outcome),
            ResponseMode::DerivedSummary => self.slots_summary(outcome),
        }
    }

    async fn passthrough(&self, request: &InboundRequest) -> OutwardResponse {
        if !self.policy.passthrough_unknown_actions {
            return OutwardResponse::json_error(StatusCode::NOT_FOUND, "unknown action");
        }

        tracing::debug!(action = request.action.as_deref().unwrap_or("-"), "Generic passthrough");
        let outcome = self.upstream.call(UpstreamRequest::get(request.query.clone())).await;
        self.json_passthrough(outcome)
    }

    async fn route_post(&self, request: &InboundRequest) -> OutwardResponse {
        let spec = actions::create_action();
        let body = request.body.clone().unwrap_or_else(|| Bytes::from_static(b"{}"));

        let fields = match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) | Err(_) => {
                return OutwardResponse::json_error(StatusCode::BAD_REQUEST, "invalid json body");
            }
        };

        let missing: Vec<&str> = spec
            .required_fields
            .iter()
            .copied()
            .filter(|field| !is_present(fields.get(*field)))
            .collect();
        if !missing.is_empty() {
            tracing::debug!(missing = ?missing, "Booking rejected before upstream call");
            return OutwardResponse::json(
                StatusCode::BAD_REQUEST,
                json!({ "ok": false, "error": "missing required fields", "missing": missing }),
            );
        }

        let query = vec![("action".to_string(), spec.upstream_name().to_string())];
        let outcome = self.upstream.call(UpstreamRequest::post_json(query, body)).await;
        self.json_passthrough(outcome)
    }

    /// Json → 200 verbatim; anything else → 502 envelope.
    fn json_passthrough(&self, outcome: UpstreamOutcome) -> OutwardResponse {
        match outcome {
            UpstreamOutcome::Json(value) => OutwardResponse::json(StatusCode::OK, value),
            other => self.upstream_failure(other),
        }
    }

    fn upstream_failure(&self, outcome: UpstreamOutcome) -> OutwardResponse {
        let body = match outcome {
            UpstreamOutcome::Unusable { reason, raw } => json!({
                "ok": false,
                "error": reason.as_str(),
                "raw": bounded_preview(&raw, self.policy.preview_chars),
            }),
            UpstreamOutcome::TextBody(text) => json!({
                "ok": false,
                "error": "non-json-response",
                "raw": bounded_preview(&text, self.policy.preview_chars),
            }),
            UpstreamOutcome::TimedOut => json!({ "ok": false, "error": "upstream-timeout" }),
            UpstreamOutcome::NetworkError(message) => json!({
                "ok": false,
                "error": "upstream-network-error",
                "detail": bounded_preview(&message, self.policy.preview_chars),
            }),
            UpstreamOutcome::Json(_) => json!({ "ok": false, "error": "unexpected-response-shape" }),
        };
        OutwardResponse::json(StatusCode::BAD_GATEWAY, body)
    }

    fn cancel_fragment(&self, outcome: UpstreamOutcome) -> OutwardResponse {
        match outcome {
            UpstreamOutcome::Json(value) => {
                if value.get("ok").is_some_and(is_truthy) {
                    return OutwardResponse::fragment(StatusCode::OK, CANCEL_SUCCESS);
                }
                let message = match value.get("error") {
                    // The fragment renderer escapes; only the length is capped here.
                    Some(Value::String(error)) if !error.trim().is_empty() => {
                        format!("{} ({})", CANCEL_FAILURE, truncate_chars(error, self.policy.preview_chars))
                    }
                    Some(error) if !error.is_null() && !error.is_string() => {
                        let error = error.to_string();
                        format!("{} ({})", CANCEL_FAILURE, truncate_chars(&error, self.policy.preview_chars))
                    }
                    _ => CANCEL_FAILURE.to_string(),
                };
                OutwardResponse::fragment(StatusCode::OK, &message)
            }
            UpstreamOutcome::TextBody(text) if !text.trim().is_empty() => {
                if self.policy.trust_plain_text_cancel {
                    OutwardResponse::fragment(StatusCode::OK, CANCEL_SUCCESS)
                } else {
                    tracing::warn!("Plain-text cancel response not trusted");
                    OutwardResponse::fragment(StatusCode::BAD_GATEWAY, CANCEL_FAILURE)
                }
            }
            other => {
                tracing::warn!(outcome = other.kind(), "Cancel failed upstream");
                OutwardResponse::fragment(StatusCode::BAD_GATEWAY, CANCEL_FAILURE)
            }
        }
    }

    fn slots_summary(&self, outcome: UpstreamOutcome) -> OutwardResponse {
        let days = match outcome {
            UpstreamOutcome::Json(Value::Object(days)) => days,
            UpstreamOutcome::Json(_) => {
                return OutwardResponse::json_error(StatusCode::BAD_GATEWAY, "unexpected-summary-shape");
            }
            other => return self.upstream_failure(other),
        };

        if days.get("ok") == Some(&Value::Bool(false)) {
            let detail = days
                .get("error")
                .map(|e| match e {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_default();
            return OutwardResponse::json(
                StatusCode::BAD_GATEWAY,
                json!({
                    "ok": false,
                    "error": "upstream-rejected",
                    "detail": bounded_preview(&detail, self.policy.preview_chars),
                }),
            );
        }

        OutwardResponse::json(
            StatusCode::OK,
            json!({ "ok": true, "availableDates": available_dates(&days) }),
        )
    }
}

/// Outbound GET for a known action.
fn upstream_get(spec: &ActionSpec, request: &InboundRequest) -> UpstreamRequest {
    match spec.body_mode {
        BodyMode::DerivedQuery => {
            let mut query = vec![("action".to_string(), spec.upstream_name().to_string())];
            for field in spec.required_fields {
                if let Some(value) = request.param(field) {
                    query.push((field.to_string(), value.to_string()));
                }
            }
            UpstreamRequest::get(query)
        }
        BodyMode::ForwardQuery | BodyMode::ForwardJsonBody => UpstreamRequest::get(request.query.clone()),
    }
}

fn first_missing_param(spec: &ActionSpec, request: &InboundRequest) -> Option<&'static str> {
    spec.required_fields
        .iter()
        .copied()
        .find(|field| request.param(field).map_or(true, |v| v.trim().is_empty()))
}

/// Present means: exists, not null, and not a blank string.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// JavaScript truthiness, which is what the upstream's `ok` field follows.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Dates whose slot array is non-empty, in upstream key order.
fn available_dates(days: &Map<String, Value>) -> Vec<String> {
    days.iter()
        .filter(|(_, slots)| slots.as_array().is_some_and(|s| !s.is_empty()))
        .map(|(date, _)| date.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::upstream::UnusableReason;

    /// Records every call and answers with a canned outcome.
    struct RecordingUpstream {
        outcome: UpstreamOutcome,
        calls: Mutex<Vec<UpstreamRequest>>,
    }

    impl RecordingUpstream {
        fn answering(outcome: UpstreamOutcome) -> Self {
            Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<UpstreamRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Upstream for RecordingUpstream {
        async fn call(&self, request: UpstreamRequest) -> UpstreamOutcome {
            self.calls.lock().unwrap().push(request);
            self.outcome.clone()
        }
    }

    fn router_with(outcome: UpstreamOutcome) -> ActionRouter<RecordingUpstream> {
        ActionRouter::new(RecordingUpstream::answering(outcome), RoutePolicy::default())
    }

    fn get(query: &str) -> InboundRequest {
        InboundRequest::new(Method::GET, crate::http::request::parse_query(query))
    }

    fn post(body: Value) -> InboundRequest {
        InboundRequest::new(Method::POST, Vec::new()).with_body(body.to_string())
    }

    fn booking() -> Value {
        json!({
            "name": "Ana",
            "email": "ana@example.com",
            "phone": "+381601234567",
            "service": "Haircut",
            "barber": "Uros",
            "dateStr": "2024-01-01",
            "timeStr": "10:00"
        })
    }

    fn html_page() -> String {
        format!("<!DOCTYPE html><html><body>{}</body></html>", "Error ".repeat(300))
    }

    #[tokio::test]
    async fn test_options_is_terminal() {
        let router = router_with(UpstreamOutcome::TimedOut);
        let response = router.route(&InboundRequest::new(Method::OPTIONS, Vec::new())).await;

        assert_eq!(response, OutwardResponse::empty(StatusCode::OK));
        assert!(router.upstream().calls().is_empty());
    }

    #[tokio::test]
    async fn test_other_methods_not_allowed() {
        let router = router_with(UpstreamOutcome::TimedOut);
        let response = router.route(&InboundRequest::new(Method::DELETE, Vec::new())).await;

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.json_body(),
            Some(&json!({"ok": false, "error": "method not allowed"}))
        );
        assert!(router.upstream().calls().is_empty());
    }

    #[tokio::test]
    async fn test_slots_forwards_query_and_passes_json_through() {
        let router = router_with(UpstreamOutcome::Json(json!({"slots": ["10:00", "11:00"]})));
        let response = router.route(&get("action=slots&barber=Uros&date=2024-01-01")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json_body(), Some(&json!({"slots": ["10:00", "11:00"]})));

        let calls = router.upstream().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::GET);
        assert_eq!(
            calls[0].query,
            crate::http::request::parse_query("action=slots&barber=Uros&date=2024-01-01")
        );
    }

    #[tokio::test]
    async fn test_slots_missing_fields_makes_no_call() {
        let router = router_with(UpstreamOutcome::Json(json!({})));
        let response = router.route(&get("action=slots")).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json_body(),
            Some(&json!({"ok": false, "error": "missing required field barber"}))
        );
        assert!(router.upstream().calls().is_empty());

        let response = router.route(&get("action=getAvailableSlots&barber=Uros&date=%20")).await;
        assert_eq!(
            response.json_body(),
            Some(&json!({"ok": false, "error": "missing required field date"}))
        );
        assert!(router.upstream().calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_services_requires_barber() {
        let router = router_with(UpstreamOutcome::Json(json!([{"name": "Haircut"}])));

        let response = router.route(&get("action=getServices")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);

        let response = router.route(&get("action=getServices&barber=Uros")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json_body(), Some(&json!([{"name": "Haircut"}])));
    }

    #[tokio::test]
    async fn test_non_json_outcomes_become_502() {
        let cases = [
            (
                UpstreamOutcome::Unusable { reason: UnusableReason::HtmlErrorPage, raw: "<b>x</b>".into() },
                json!({"ok": false, "error": "html-error-page", "raw": "&lt;b&gt;x&lt;/b&gt;"}),
            ),
            (
                UpstreamOutcome::TextBody("hello".into()),
                json!({"ok": false, "error": "non-json-response", "raw": "hello"}),
            ),
            (UpstreamOutcome::TimedOut, json!({"ok": false, "error": "upstream-timeout"})),
            (
                UpstreamOutcome::NetworkError("connection refused".into()),
                json!({"ok": false, "error": "upstream-network-error", "detail": "connection refused"}),
            ),
        ];

        for (outcome, expected) in cases {
            let router = router_with(outcome);
            let response = router.route(&get("action=getServices&barber=Uros")).await;
            assert_eq!(response.status, StatusCode::BAD_GATEWAY);
            assert_eq!(response.json_body(), Some(&expected));
        }
    }

    #[tokio::test]
    async fn test_unknown_action_passthrough() {
        let router = router_with(UpstreamOutcome::Json(json!({"ok": true, "barbers": ["Uros"]})));
        let response = router.route(&get("action=getBarbers&x=1")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(router.upstream().calls()[0].query.len(), 2);

        let response = router.route(&get("")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(router.upstream().calls()[1].query.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_action_rejected_when_passthrough_disabled() {
        let policy = RoutePolicy {
            passthrough_unknown_actions: false,
            ..RoutePolicy::default()
        };
        let router = ActionRouter::new(RecordingUpstream::answering(UpstreamOutcome::TimedOut), policy);
        let response = router.route(&get("action=getBarbers")).await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(
            response.json_body(),
            Some(&json!({"ok": false, "error": "unknown action"}))
        );
        assert!(router.upstream().calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_success_fragment() {
        let router = router_with(UpstreamOutcome::Json(json!({"ok": true, "secret": "<internal>"})));
        let response = router.route(&get("action=cancel&bookingId=42")).await;

        assert_eq!(response.status, StatusCode::OK);
        let html = response.html_body().unwrap();
        assert!(html.contains(CANCEL_SUCCESS));
        assert!(!html.contains("internal"));
        assert_eq!(router.upstream().calls()[0].param("bookingId"), Some("42"));
    }

    #[tokio::test]
    async fn test_cancel_missing_booking_id() {
        let router = router_with(UpstreamOutcome::Json(json!({"ok": true})));
        let response = router.route(&get("action=cancel")).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.html_body().unwrap().contains("missing required field bookingId"));
        assert!(router.upstream().calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_refusal_uses_escaped_error() {
        let router = router_with(UpstreamOutcome::Json(json!({"ok": false, "error": "<b>already cancelled</b>"})));
        let response = router.route(&get("action=cancel&bookingId=42")).await;

        let html = response.html_body().unwrap();
        assert!(html.contains(CANCEL_FAILURE));
        assert!(html.contains("&lt;b&gt;already cancelled&lt;/b&gt;"));
        assert!(!html.contains("<b>"));

        let router = router_with(UpstreamOutcome::Json(json!({"ok": 0})));
        let response = router.route(&get("action=cancel&bookingId=42")).await;
        assert!(response.html_body().unwrap().contains(CANCEL_FAILURE));
    }

    #[tokio::test]
    async fn test_cancel_plain_text_policy() {
        let router = router_with(UpstreamOutcome::TextBody("Termin je otkazan.".into()));
        let response = router.route(&get("action=cancel&bookingId=42")).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.html_body().unwrap().contains(CANCEL_SUCCESS));

        let strict = RoutePolicy {
            trust_plain_text_cancel: false,
            ..RoutePolicy::default()
        };
        let router = ActionRouter::new(
            RecordingUpstream::answering(UpstreamOutcome::TextBody("Termin je otkazan.".into())),
            strict,
        );
        let response = router.route(&get("action=cancel&bookingId=42")).await;
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert!(response.html_body().unwrap().contains(CANCEL_FAILURE));

        let router = router_with(UpstreamOutcome::TextBody("  ".into()));
        let response = router.route(&get("action=cancel&bookingId=42")).await;
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_cancel_unusable_never_echoes_raw_page() {
        let router = router_with(UpstreamOutcome::Unusable {
            reason: UnusableReason::HtmlErrorPage,
            raw: html_page(),
        });
        let response = router.route(&get("action=cancel&bookingId=42")).await;

        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        let html = response.html_body().unwrap();
        assert!(html.contains(CANCEL_FAILURE));
        assert!(!html.contains("Error Error"));
    }

    #[tokio::test]
    async fn test_slots_summary_filters_and_keeps_order() {
        let router = router_with(UpstreamOutcome::Json(json!({
            "2024-01-03": ["09:00"],
            "2024-01-01": ["10:00"],
            "2024-01-02": [],
            "2024-01-04": "closed"
        })));
        let response = router.route(&get("action=slotsSummary&barber=Uros&date=ignored")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.json_body(),
            Some(&json!({"ok": true, "availableDates": ["2024-01-03", "2024-01-01"]}))
        );

        let calls = router.upstream().calls();
        assert_eq!(
            calls[0].query,
            vec![
                ("action".to_string(), "allSlots".to_string()),
                ("barber".to_string(), "Uros".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_slots_summary_bad_shapes() {
        let router = router_with(UpstreamOutcome::Json(json!(["2024-01-01"])));
        let response = router.route(&get("action=slotsSummary&barber=Uros")).await;
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.json_body(),
            Some(&json!({"ok": false, "error": "unexpected-summary-shape"}))
        );

        let router = router_with(UpstreamOutcome::Json(json!({"ok": false, "error": "unknown barber"})));
        let response = router.route(&get("action=slotsSummary&barber=Nobody")).await;
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(response.json_body().unwrap()["error"], "upstream-rejected");

        let router = router_with(UpstreamOutcome::TimedOut);
        let response = router.route(&get("action=slotsSummary&barber=Uros")).await;
        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        assert_eq!(response.json_body().unwrap()["error"], "upstream-timeout");

        let router = router_with(UpstreamOutcome::Json(json!({})));
        let response = router.route(&get("action=slotsSummary")).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(router.upstream().calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_forwards_body_unchanged() {
        let router = router_with(UpstreamOutcome::Json(json!({"ok": true, "bookingId": "42"})));
        let body = r#"{"name":"Ana","email":"ana@example.com","phone":"1","service":"Cut","barber":"Uros","dateStr":"2024-01-01","timeStr":"10:00","extra":{"a":1}}"#;
        let request = InboundRequest::new(Method::POST, Vec::new()).with_body(body);
        let response = router.route(&request).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json_body(), Some(&json!({"ok": true, "bookingId": "42"})));

        let calls = router.upstream().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(calls[0].query, vec![("action".to_string(), "create".to_string())]);
        assert_eq!(calls[0].body.as_deref(), Some(body.as_bytes()));
    }

    #[tokio::test]
    async fn test_create_missing_phone_makes_no_call() {
        let router = router_with(UpstreamOutcome::Json(json!({"ok": true})));
        let mut body = booking();
        body.as_object_mut().unwrap().remove("phone");
        body["email"] = json!("  ");

        let response = router.route(&post(body)).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json_body(),
            Some(&json!({"ok": false, "error": "missing required fields", "missing": ["email", "phone"]}))
        );
        assert!(router.upstream().calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_non_object_bodies() {
        let router = router_with(UpstreamOutcome::Json(json!({"ok": true})));
        for body in ["not json", "[1,2]", "\"text\""] {
            let request = InboundRequest::new(Method::POST, Vec::new()).with_body(body);
            let response = router.route(&request).await;
            assert_eq!(response.status, StatusCode::BAD_REQUEST);
            assert_eq!(response.json_body().unwrap()["error"], "invalid json body");
        }

        let response = router.route(&InboundRequest::new(Method::POST, Vec::new())).await;
        assert_eq!(response.json_body().unwrap()["error"], "missing required fields");
        assert!(router.upstream().calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_html_page_is_bounded_502() {
        let page = html_page();
        let router = router_with(crate::upstream::classify(&page, Some("text/html")));
        let response = router.route(&post(booking())).await;

        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
        let body = response.json_body().unwrap();
        assert_eq!(body["error"], "html-error-page");
        let raw = body["raw"].as_str().unwrap();
        assert!(raw.chars().count() <= DEFAULT_PREVIEW_CHARS);
        assert!(!raw.contains('<'));
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("yes")));
        assert!(is_truthy(&json!({})));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }
}
