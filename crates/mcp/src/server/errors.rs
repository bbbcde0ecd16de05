//! Structured error helpers.
//!
//! Parameter problems become MCP `invalid_params` protocol errors. Failures
//! reported by the Prefect API become tool results with `is_error` set, so the
//! calling model sees what went wrong and can decide what to do next.

use chrono::Utc;
use prefect_mcp_api::ApiError;
use prefect_mcp_util::http::status_error_message;
use prefect_mcp_util::{redact_sensitive, truncate_preview};
use rmcp::model::{CallToolResult, ErrorData};
use serde_json::Value;

const BODY_PREVIEW_LIMIT: usize = 500;

fn build_error_data(
    error_code: &str,
    category: &str,
    message: &str,
    context: Value,
    retryable: bool,
    suggested_action: &str,
) -> Value {
    serde_json::json!({
        "error_code": error_code,
        "category": category,
        "message": message,
        "context": context,
        "retryable": retryable,
        "suggested_action": suggested_action,
        "correlation_id": format!("prefect-{}", Utc::now().timestamp_millis()),
    })
}

pub fn invalid_params_error(error_code: &str, message: impl Into<String>, context: Value, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::invalid_params(
        message.clone(),
        Some(build_error_data(
            error_code,
            "validation",
            &message,
            context,
            false,
            suggested_action,
        )),
    )
}

/// Tool-level error for a failed Prefect API call.
pub fn api_error_result(tool_name: &str, error: &ApiError) -> CallToolResult {
    let message = redact_sensitive(&error.to_string());
    let mut context = serde_json::json!({ "tool": tool_name });

    let (error_code, suggested_action) = match error {
        ApiError::Request { url, .. } => {
            context["url"] = Value::String(url.clone());
            context["timed_out"] = Value::Bool(error.is_timeout());
            (
                "PREFECT_REQUEST_FAILED",
                "Check that the Prefect API is reachable at PREFECT_API_URL, then retry.",
            )
        }
        ApiError::Status { url, status, body, .. } => {
            context["url"] = Value::String(url.clone());
            context["status_code"] = Value::from(status.as_u16());
            context["body_preview"] = Value::String(truncate_preview(body, BODY_PREVIEW_LIMIT));
            if let Some(hint) = status_error_message(status.as_u16()) {
                context["hint"] = Value::String(hint);
            }
            if status.as_u16() == 404 {
                (
                    "PREFECT_NOT_FOUND",
                    "Verify the identifier with a list_* or search_* tool.",
                )
            } else if error.is_retryable() {
                ("PREFECT_HTTP_STATUS", "The Prefect API is unavailable or throttling; retry later.")
            } else {
                (
                    "PREFECT_HTTP_STATUS",
                    "Fix the request according to the status code and body preview.",
                )
            }
        }
        ApiError::InvalidResponse { url, .. } | ApiError::UnexpectedShape { url, .. } => {
            context["url"] = Value::String(url.clone());
            (
                "PREFECT_INVALID_RESPONSE",
                "Check that PREFECT_API_URL points at the Prefect REST API root (usually ending in /api).",
            )
        }
    };

    CallToolResult::structured_error(build_error_data(
        error_code,
        "remote",
        &message,
        context,
        error.is_retryable(),
        suggested_action,
    ))
}

/// Tool-level error for a state transition the orchestrator refused.
pub fn rejected_transition_result(message: impl Into<String>, context: Value, retryable: bool) -> CallToolResult {
    let message = message.into();
    CallToolResult::structured_error(build_error_data(
        "PREFECT_TRANSITION_REJECTED",
        "orchestration",
        &message,
        context,
        retryable,
        "Inspect the flow run with get_flow_run; use force=true only if the cancellation must bypass orchestration rules.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_params_carry_structured_data() {
        let error = invalid_params_error(
            "INVALID_LIMIT",
            "limit must be between 1 and 200, got 0",
            serde_json::json!({ "field": "limit" }),
            "Use a limit between 1 and 200.",
        );
        assert_eq!(error.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        let data = error.data.expect("data present");
        assert_eq!(data["error_code"], "INVALID_LIMIT");
        assert_eq!(data["category"], "validation");
        assert_eq!(data["retryable"], false);
        assert!(data["correlation_id"].as_str().unwrap().starts_with("prefect-"));
    }

    #[test]
    fn rejected_transitions_are_tool_errors() {
        let result = rejected_transition_result("cancellation was rejected", serde_json::json!({ "status": "REJECT" }), false);
        assert_eq!(result.is_error, Some(true));
        let structured = result.structured_content.expect("structured content");
        assert_eq!(structured["error_code"], "PREFECT_TRANSITION_REJECTED");
        assert_eq!(structured["context"]["status"], "REJECT");
    }
}
