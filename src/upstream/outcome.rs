//! The result of one upstream call.

use serde_json::Value;

/// Why an upstream payload could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusableReason {
    /// Content-Type said JSON but the body did not parse.
    InvalidJsonDeclared,
    /// An HTML error, login or redirect page.
    HtmlErrorPage,
}

impl UnusableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnusableReason::InvalidJsonDeclared => "invalid-json-declared",
            UnusableReason::HtmlErrorPage => "html-error-page",
        }
    }
}

impl std::fmt::Display for UnusableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly one of these is produced per outbound call.
///
/// Timeout, transport failure and parse failure are separate variants so
/// callers can never confuse them.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamOutcome {
    /// Usable JSON, possibly recovered from surrounding noise.
    Json(Value),
    /// Plain text that is neither JSON nor a known error page.
    TextBody(String),
    /// Payload rejected; `raw` is already truncated to the preview bound.
    Unusable { reason: UnusableReason, raw: String },
    /// The call did not complete within the configured bound.
    TimedOut,
    /// No response was obtained (DNS, refused, reset, broken body).
    NetworkError(String),
}

impl UpstreamOutcome {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamOutcome::Json(_) => "json",
            UpstreamOutcome::TextBody(_) => "text",
            UpstreamOutcome::Unusable { .. } => "unusable",
            UpstreamOutcome::TimedOut => "timeout",
            UpstreamOutcome::NetworkError(_) => "network_error",
        }
    }
}
