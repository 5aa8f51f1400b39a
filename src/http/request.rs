//! Inbound request extraction and request IDs.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for tracing
//! - Reduce the HTTP request to what routing needs: method, origin,
//!   action, ordered query pairs and the raw body
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Query pairs keep their original order and duplicates; lookups take the first

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, Method, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request ID in both directions.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Request ID of an inbound request, or `unknown` if the layer did not run.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// An inbound request, parsed once and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundRequest {
    pub method: Method,
    pub origin: Option<String>,
    pub action: Option<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl InboundRequest {
    pub fn new(method: Method, query: Vec<(String, String)>) -> Self {
        let action = first_value(&query, "action").map(String::from);
        Self {
            method,
            origin: None,
            action,
            query,
            body: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Build from the pieces axum hands a handler.
    pub fn from_parts(method: Method, uri: &Uri, headers: &HeaderMap, body: Bytes) -> Self {
        let query = uri.query().map(parse_query).unwrap_or_default();
        let origin = headers
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let mut request = Self::new(method, query);
        request.origin = origin;
        if !body.is_empty() {
            request.body = Some(body);
        }
        request
    }

    /// First value of the query parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        first_value(&self.query, name)
    }
}

fn first_value<'a>(query: &'a [(String, String)], name: &str) -> Option<&'a str> {
    query.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

/// Decode an `application/x-www-form-urlencoded` query string in order.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_from_parts() {
        let uri: Uri = "/api?action=slots&barber=Uro%C5%A1&date=2024-01-01&barber=Other"
            .parse()
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://booking.example.com"));

        let request = InboundRequest::from_parts(Method::GET, &uri, &headers, Bytes::new());

        assert_eq!(request.action.as_deref(), Some("slots"));
        assert_eq!(request.origin.as_deref(), Some("https://booking.example.com"));
        assert_eq!(request.param("barber"), Some("Uroš"));
        assert_eq!(request.query.len(), 4);
        assert_eq!(request.query[0], ("action".to_string(), "slots".to_string()));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_from_parts_without_query() {
        let uri: Uri = "/api".parse().unwrap();
        let request = InboundRequest::from_parts(
            Method::POST,
            &uri,
            &HeaderMap::new(),
            Bytes::from_static(b"{}"),
        );

        assert!(request.action.is_none());
        assert!(request.query.is_empty());
        assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_parse_query_plus_and_empty_values() {
        assert_eq!(
            parse_query("name=Ana+Maria&note="),
            vec![
                ("name".to_string(), "Ana Maria".to_string()),
                ("note".to_string(), String::new())
            ]
        );
    }

    #[test]
    fn test_make_request_uuid() {
        let request = Request::new(());
        let id = MakeRequestUuid.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
