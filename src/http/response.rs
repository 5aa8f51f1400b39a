//! Outward responses.
//!
//! # Responsibilities
//! - Represent the single response produced per inbound request
//! - Render JSON envelopes and the HTML fragments used by browser links
//!
//! # Design Decisions
//! - Status codes are chosen by the gateway, never copied from upstream
//! - Fragments are built from escaped text only

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};

use crate::upstream::preview::escape_markup;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";

/// Body of an outward response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(Value),
    Html(String),
}

/// What the gateway sends back for one inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct OutwardResponse {
    pub status: StatusCode,
    pub payload: Payload,
}

impl OutwardResponse {
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            payload: Payload::Empty,
        }
    }

    pub fn json(status: StatusCode, value: Value) -> Self {
        Self {
            status,
            payload: Payload::Json(value),
        }
    }

    /// `{ok:false, error:<message>}`
    pub fn json_error(status: StatusCode, error: impl Into<String>) -> Self {
        Self::json(status, json!({ "ok": false, "error": error.into() }))
    }

    /// Minimal HTML page carrying one message. `message` is escaped here.
    pub fn fragment(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            payload: Payload::Html(render_fragment(message)),
        }
    }

    pub fn content_type(&self) -> Option<&'static str> {
        match self.payload {
            Payload::Empty => None,
            Payload::Json(_) => Some(CONTENT_TYPE_JSON),
            Payload::Html(_) => Some(CONTENT_TYPE_HTML),
        }
    }

    /// JSON payload, if any.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// HTML payload, if any.
    pub fn html_body(&self) -> Option<&str> {
        match &self.payload {
            Payload::Html(html) => Some(html),
            _ => None,
        }
    }
}

/// Wrap an escaped message in a page a browser can show on its own.
pub fn render_fragment(message: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Booking</title></head>\
         <body><p>{}</p></body></html>",
        escape_markup(message)
    )
}

impl IntoResponse for OutwardResponse {
    fn into_response(self) -> Response {
        let content_type = self.content_type();
        let mut response = match self.payload {
            Payload::Empty => self.status.into_response(),
            Payload::Json(value) => (self.status, value.to_string()).into_response(),
            Payload::Html(html) => (self.status, html).into_response(),
        };
        if let Some(content_type) = content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        response
    }
}
