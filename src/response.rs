//! Response values and the default error-output collaborator.

use http::StatusCode;
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Response body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

impl Body {
    /// Serialized body bytes
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Body::Empty => Vec::new(),
            Body::Json(v) => v.to_string().into_bytes(),
            Body::Text(s) => s.clone().into_bytes(),
            Body::Bytes(b) => b.clone(),
        }
    }
}

/// Response produced by a handler, a file route or an error page.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    pub body: Body,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new(200)
    }
}

impl HandlerResponse {
    /// Empty response with the given status
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: Body::Empty,
        }
    }

    /// Create a JSON response with default headers
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut res = Self::new(status);
        res.set_header("content-type", "application/json".to_string());
        res.body = Body::Json(body);
        res
    }

    #[must_use]
    pub fn text(status: u16, content_type: &str, body: String) -> Self {
        let mut res = Self::new(status);
        res.set_header("content-type", content_type.to_string());
        res.body = Body::Text(body);
        res
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Canonical reason phrase for a status code
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
}

/// Output format for error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    Json,
    Html,
    Text,
}

impl ErrorFormat {
    /// Pick a format from an `Accept` header value; plain text when nothing better is accepted
    #[must_use]
    pub fn from_accept(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return ErrorFormat::Text;
        };
        for media in accept.split(',') {
            let media = media.split(';').next().unwrap_or("").trim();
            if media == "application/json" || media.ends_with("+json") {
                return ErrorFormat::Json;
            }
            if media == "text/html" || media == "application/xhtml+xml" {
                return ErrorFormat::Html;
            }
        }
        ErrorFormat::Text
    }

    /// Parse an explicit format name (`json`, `html`, `text`)
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(ErrorFormat::Json),
            "html" => Some(ErrorFormat::Html),
            "text" | "txt" | "plain" => Some(ErrorFormat::Text),
            _ => None,
        }
    }
}

/// Collaborator that renders an error response when no status-code route handles it.
pub trait ErrorOutput: Send + Sync {
    fn output_error(&self, status: u16, message: &str, format: ErrorFormat) -> HandlerResponse;
}

/// Renders `{ "error": message }`, a minimal HTML page, or plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorOutput;

impl ErrorOutput for DefaultErrorOutput {
    fn output_error(&self, status: u16, message: &str, format: ErrorFormat) -> HandlerResponse {
        match format {
            ErrorFormat::Json => HandlerResponse::json(status, json!({ "error": message })),
            ErrorFormat::Html => {
                let reason = status_reason(status);
                HandlerResponse::text(
                    status,
                    "text/html; charset=utf-8",
                    format!(
                        "<!DOCTYPE html>\n<html><head><title>{status} {reason}</title></head>\
                         <body><h1>{reason}</h1><p>{}</p></body></html>\n",
                        html_escape(message)
                    ),
                )
            }
            ErrorFormat::Text => HandlerResponse::text(
                status,
                "text/plain; charset=utf-8",
                format!("{message}\n"),
            ),
        }
    }
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(999), "Unknown Status");
    }

    #[test]
    fn test_format_from_accept() {
        assert_eq!(ErrorFormat::from_accept(None), ErrorFormat::Text);
        assert_eq!(
            ErrorFormat::from_accept(Some("text/html,application/xhtml+xml;q=0.9")),
            ErrorFormat::Html
        );
        assert_eq!(
            ErrorFormat::from_accept(Some("application/problem+json")),
            ErrorFormat::Json
        );
        assert_eq!(ErrorFormat::from_accept(Some("*/*")), ErrorFormat::Text);
    }

    #[test]
    fn test_default_error_output() {
        let out = DefaultErrorOutput;
        let res = out.output_error(404, "Not Found", ErrorFormat::Json);
        assert_eq!(res.status, 404);
        assert_eq!(res.get_header("Content-Type"), Some("application/json"));
        assert_eq!(res.body, Body::Json(json!({ "error": "Not Found" })));

        let html = out.output_error(403, "<no>", ErrorFormat::Html);
        let body = String::from_utf8(html.body.to_bytes()).unwrap();
        assert!(body.contains("<h1>Forbidden</h1>"));
        assert!(body.contains("&lt;no&gt;"));
    }

    #[test]
    fn test_set_header_replaces() {
        let mut res = HandlerResponse::new(200);
        res.set_header("Location", "/a".to_string());
        res.set_header("location", "/b".to_string());
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("LOCATION"), Some("/b"));
    }
}
