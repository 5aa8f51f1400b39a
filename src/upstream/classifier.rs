//! Response classification.
//!
//! Decides whether an upstream body is usable JSON. The upstream is a script
//! runtime that sometimes wraps its JSON in diagnostic HTML, so JSON is
//! recovered whenever it is structurally present before the payload is
//! declared unusable.
//!
//! # Policy (first match wins)
//! ```text
//! 1. Content-Type says JSON    → strict parse, else Unusable(invalid-json-declared)
//! 2. Trimmed text starts { or [ → strict parse, else fall through
//! 3. First balanced {...}       → parse the extracted object, else fall through
//! 4. HTML / login marker        → Unusable(html-error-page)
//! 5. Anything else              → TextBody
//! ```

use serde_json::Value;

use crate::upstream::outcome::{UnusableReason, UpstreamOutcome};
use crate::upstream::preview::{truncate_chars, DEFAULT_PREVIEW_CHARS};

/// Lowercase markers of pages that never carry a usable payload.
const UNUSABLE_PAGE_MARKERS: &[&str] = &[
    "<!doctype html",
    "<html",
    "google docs",
    "accounts.google.com",
    "servicelogin",
];

/// Pure classifier over upstream text. Holds only the preview bound.
#[derive(Debug, Clone, Copy)]
pub struct ResponseClassifier {
    preview_chars: usize,
}

impl Default for ResponseClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_CHARS)
    }
}

impl ResponseClassifier {
    pub fn new(preview_chars: usize) -> Self {
        Self { preview_chars }
    }

    pub fn preview_chars(&self) -> usize {
        self.preview_chars
    }

    /// Classify a raw upstream body.
    pub fn classify(&self, raw: &str, content_type: Option<&str>) -> UpstreamOutcome {
        if content_type.is_some_and(declares_json) {
            return match serde_json::from_str::<Value>(raw) {
                Ok(value) => UpstreamOutcome::Json(value),
                Err(_) => self.unusable(UnusableReason::InvalidJsonDeclared, raw),
            };
        }

        let trimmed = raw.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
                return UpstreamOutcome::Json(value);
            }
        }

        if let Some(candidate) = extract_balanced_object(raw) {
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                return UpstreamOutcome::Json(value);
            }
        }

        if is_unusable_page(raw) {
            return self.unusable(UnusableReason::HtmlErrorPage, raw);
        }

        UpstreamOutcome::TextBody(raw.to_string())
    }

    fn unusable(&self, reason: UnusableReason, raw: &str) -> UpstreamOutcome {
        UpstreamOutcome::Unusable {
            reason,
            raw: truncate_chars(raw, self.preview_chars).to_string(),
        }
    }
}

/// Classify with the default preview bound.
pub fn classify(raw: &str, content_type: Option<&str>) -> UpstreamOutcome {
    ResponseClassifier::default().classify(raw, content_type)
}

/// `application/json`, `text/json`, `application/problem+json`, with or
/// without parameters.
fn declares_json(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence == "text/json" || essence.ends_with("+json")
}

fn is_unusable_page(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    UNUSABLE_PAGE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Find the first `{` and return the slice up to the `}` that brings the
/// nesting depth back to zero. Braces inside JSON string literals are not
/// counted. Returns `None` when the object never closes.
fn extract_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}
