//! Errors raised while talking to the Prefect API.

use prefect_mcp_util::http::{JsonParseError, is_retryable_status};
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout, TLS).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status.
    #[error("{method} {url} returned HTTP {status}")]
    Status {
        method: String,
        url: String,
        status: StatusCode,
        body: String,
    },

    /// The body was not valid JSON.
    #[error("invalid response from {url}: {source}")]
    InvalidResponse {
        url: String,
        #[source]
        source: JsonParseError,
    },

    /// The body was JSON but not the shape the endpoint documents.
    #[error("unexpected response from {url}: {reason}")]
    UnexpectedShape { url: String, reason: String },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Request { source, .. } if source.is_timeout())
    }

    /// Whether repeating the same call later could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Request { .. } => true,
            ApiError::Status { status, .. } => is_retryable_status(*status),
            ApiError::InvalidResponse { .. } | ApiError::UnexpectedShape { .. } => false,
        }
    }
}
