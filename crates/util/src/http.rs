//! # HTTP Utilities
//!
//! Helpers for interpreting Prefect API responses: strict JSON parsing with
//! readable errors, and hints for status codes a user can act on.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::text_processing::truncate_preview;

const BODY_PREVIEW_LIMIT: usize = 200;

/// Return a user-friendly hint for common HTTP error statuses.
///
/// # Example
/// ```rust
/// use prefect_mcp_util::http::status_error_message;
///
/// let unauthorized = status_error_message(401).unwrap();
/// assert!(unauthorized.contains("PREFECT_API_KEY"));
/// assert!(status_error_message(500).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 => Some("Unauthorized (401). Hint: set PREFECT_API_KEY to a valid API key".into()),
        403 => Some("Forbidden (403). Hint: check the API key's workspace access and role".into()),
        404 => Some("Not found (404). Hint: check the identifier and PREFECT_API_URL".into()),
        422 => Some("Unprocessable (422). Hint: the API rejected the request body; check filter fields".into()),
        _ => None,
    }
}

/// Whether a failed request with this status is worth retrying later.
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::REQUEST_TIMEOUT
}

/// Parse HTTP response text into JSON, providing detailed errors on failure.
///
/// The error carries the originating status and a truncated preview of the
/// body so truncated or HTML error pages are easy to recognise.
pub fn parse_response_json_strict(text: &str, status: Option<StatusCode>) -> Result<Value, JsonParseError> {
    serde_json::from_str::<Value>(text).map_err(|error| {
        let status_note = status
            .map(|code| format!("status {code}"))
            .unwrap_or_else(|| "unknown status".to_string());
        JsonParseError::new(status_note, error, truncate_preview(text, BODY_PREVIEW_LIMIT))
    })
}

/// Error returned when strict JSON parsing of an HTTP response fails.
#[derive(Debug, Error)]
#[error("failed to parse JSON response ({status_note}): {source}. body preview: {body_preview}")]
pub struct JsonParseError {
    status_note: String,
    #[source]
    source: serde_json::Error,
    body_preview: String,
}

impl JsonParseError {
    pub fn new(status_note: String, source: serde_json::Error, body_preview: String) -> Self {
        Self {
            status_note,
            source,
            body_preview,
        }
    }

    /// Access the truncated response preview captured during parsing.
    pub fn body_preview(&self) -> &str {
        &self.body_preview
    }
}
