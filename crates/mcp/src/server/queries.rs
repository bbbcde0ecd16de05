//! Translation of tool parameters into Prefect request bodies.
//!
//! Everything here runs before any network call; a parameter that cannot be
//! turned into a valid request is rejected with an `invalid_params` error.

use chrono::{DateTime, Utc};
use prefect_mcp_types::{
    DeploymentFilter, DeploymentQuery, DeploymentRef, FilterRequest, FlowFilter, FlowQuery, FlowRunCreate, FlowRunFilter, FlowRunQuery,
    Limit, MAX_LIMIT, SetStateRequest, StateCreate,
};
use prefect_mcp_util::parse_timestamp;
use rmcp::model::ErrorData;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::server::errors::invalid_params_error;
use crate::server::schemas::{
    CancelFlowRunRequest, CreateFlowRunRequest, ListRequest, SearchDeploymentsRequest, SearchFlowRunsRequest, SearchFlowsRequest,
};

pub(crate) fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, ErrorData> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(missing_argument(field));
    }
    Uuid::parse_str(trimmed).map_err(|_| {
        invalid_params_error(
            "INVALID_ID",
            format!("{field} must be a UUID, got '{raw}'"),
            serde_json::json!({ "field": field, "value": raw }),
            "Copy the id from a list_* or search_* result.",
        )
    })
}

pub(crate) fn parse_deployment_ref(field: &str, raw: &str) -> Result<DeploymentRef, ErrorData> {
    if raw.trim().is_empty() {
        return Err(missing_argument(field));
    }
    raw.parse::<DeploymentRef>().map_err(|error| {
        invalid_params_error(
            "INVALID_DEPLOYMENT_REFERENCE",
            error.to_string(),
            serde_json::json!({ "field": field, "value": raw }),
            "Pass a deployment id or '<flow name>/<deployment name>' from list_deployments.",
        )
    })
}

pub(crate) fn parse_limit(limit: Option<u64>) -> Result<Limit, ErrorData> {
    Limit::from_optional(limit).map_err(|error| {
        invalid_params_error(
            "INVALID_LIMIT",
            error.to_string(),
            serde_json::json!({ "field": "limit", "value": limit, "max": MAX_LIMIT }),
            "Use a limit between 1 and 200 and page with offset.",
        )
    })
}

/// Validate the projection list. `None` and an empty list both mean "all fields".
pub(crate) fn validate_fields(fields: Option<&[String]>) -> Result<Option<Vec<String>>, ErrorData> {
    clean_list("fields", fields.map(<[String]>::to_vec))
}

pub(crate) fn list_query<S>(request: &ListRequest) -> Result<FilterRequest<S>, ErrorData> {
    Ok(FilterRequest::new(parse_limit(request.limit)?).with_offset(request.offset))
}

pub(crate) fn flow_query(request: &SearchFlowsRequest) -> Result<FlowQuery, ErrorData> {
    let mut flows = FlowFilter::default();
    if let Some(name) = clean_text(request.name.as_deref()) {
        flows = flows.with_names(vec![name]);
    }
    if let Some(pattern) = clean_text(request.name_like.as_deref()) {
        flows = flows.with_name_like(pattern);
    }
    if let Some(tags) = clean_list("tags", request.tags.clone())? {
        flows = flows.with_all_tags(tags);
    }

    Ok(FlowQuery::new(parse_limit(request.limit)?)
        .with_flows(flows)
        .with_sort(request.sort)
        .with_offset(request.offset))
}

pub(crate) fn flow_run_query(request: &SearchFlowRunsRequest) -> Result<FlowRunQuery, ErrorData> {
    let mut flow_runs = FlowRunFilter::default();
    if let Some(pattern) = clean_text(request.name_like.as_deref()) {
        flow_runs = flow_runs.with_name_like(pattern);
    }
    if let Some(raw) = clean_text(request.deployment_id.as_deref()) {
        flow_runs = flow_runs.with_deployment_ids(vec![parse_uuid("deployment_id", &raw)?]);
    }
    if let Some(state_types) = request.state_types.clone().filter(|types| !types.is_empty()) {
        flow_runs = flow_runs.with_state_types(state_types);
    }
    if let Some(state_names) = clean_list("state_names", request.state_names.clone())? {
        flow_runs = flow_runs.with_state_names(state_names);
    }
    if let Some(tags) = clean_list("tags", request.tags.clone())? {
        flow_runs = flow_runs.with_all_tags(tags);
    }

    let (after, before) = parse_time_range(
        ("start_time_after", request.start_time_after.as_deref()),
        ("start_time_before", request.start_time_before.as_deref()),
    )?;
    if let Some(after) = after {
        flow_runs = flow_runs.with_start_time_after(after);
    }
    if let Some(before) = before {
        flow_runs = flow_runs.with_start_time_before(before);
    }

    let (after, before) = parse_time_range(
        ("expected_start_time_after", request.expected_start_time_after.as_deref()),
        ("expected_start_time_before", request.expected_start_time_before.as_deref()),
    )?;
    if let Some(after) = after {
        flow_runs = flow_runs.with_expected_start_time_after(after);
    }
    if let Some(before) = before {
        flow_runs = flow_runs.with_expected_start_time_before(before);
    }

    let mut flows = FlowFilter::default();
    if let Some(name) = clean_text(request.flow_name.as_deref()) {
        flows = flows.with_names(vec![name]);
    }
    if let Some(raw) = clean_text(request.flow_id.as_deref()) {
        flows = flows.with_ids(vec![parse_uuid("flow_id", &raw)?]);
    }

    Ok(FlowRunQuery::new(parse_limit(request.limit)?)
        .with_flows(flows)
        .with_flow_runs(flow_runs)
        .with_sort(request.sort)
        .with_offset(request.offset))
}

pub(crate) fn deployment_query(request: &SearchDeploymentsRequest) -> Result<DeploymentQuery, ErrorData> {
    let mut deployments = DeploymentFilter::default();
    if let Some(name) = clean_text(request.name.as_deref()) {
        deployments = deployments.with_names(vec![name]);
    }
    if let Some(pattern) = clean_text(request.name_like.as_deref()) {
        deployments = deployments.with_name_like(pattern);
    }
    if let Some(tags) = clean_list("tags", request.tags.clone())? {
        deployments = deployments.with_all_tags(tags);
    }
    if let Some(status) = request.status {
        deployments = deployments.with_status(status);
    }
    if let Some(queue) = clean_text(request.work_queue_name.as_deref()) {
        deployments = deployments.with_work_queue_names(vec![queue]);
    }

    let mut flows = FlowFilter::default();
    if let Some(flow_name) = clean_text(request.flow_name.as_deref()) {
        flows = flows.with_names(vec![flow_name]);
    }

    Ok(DeploymentQuery::new(parse_limit(request.limit)?)
        .with_flows(flows)
        .with_deployments(deployments)
        .with_sort(request.sort)
        .with_offset(request.offset))
}

/// Check a caller-supplied filter body and apply the default limit.
pub(crate) fn raw_filter_body(criteria: &Value) -> Result<Value, ErrorData> {
    let Value::Object(object) = criteria else {
        return Err(invalid_params_error(
            "INVALID_FILTER_CRITERIA",
            "filter_criteria must be a JSON object",
            serde_json::json!({ "field": "filter_criteria", "received": json_kind(criteria) }),
            "Pass an object such as {\"flows\": {\"tags\": {\"all_\": [\"production\"]}}}.",
        ));
    };

    let mut body = object.clone();
    let limit = match body.get("limit") {
        None | Some(Value::Null) => Limit::default(),
        Some(Value::Number(number)) => match number.as_u64() {
            Some(value) => parse_limit(Some(value))?,
            None => return Err(limit_not_integer(number.to_string())),
        },
        Some(other) => return Err(limit_not_integer(other.to_string())),
    };
    body.insert("limit".to_string(), serde_json::json!(limit));
    Ok(Value::Object(body))
}

pub(crate) fn flow_run_create(request: &CreateFlowRunRequest) -> Result<(DeploymentRef, FlowRunCreate), ErrorData> {
    let deployment = parse_deployment_ref("deployment_id", &request.deployment_id)?;

    let parameters = match &request.parameters {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(parameters)) => parameters.clone(),
        Some(other) => {
            return Err(invalid_params_error(
                "INVALID_PARAMETERS",
                "parameters must be a JSON object keyed by flow parameter name",
                serde_json::json!({ "field": "parameters", "received": json_kind(other) }),
                "Pass parameters as {\"name\": value}.",
            ));
        }
    };

    let state = parse_optional_timestamp("scheduled_start_time", request.scheduled_start_time.as_deref())?.map(StateCreate::scheduled_at);

    let body = FlowRunCreate {
        parameters,
        name: clean_text(request.name.as_deref()),
        tags: clean_list("tags", request.tags.clone())?,
        state,
    };
    Ok((deployment, body))
}

pub(crate) fn cancel_request(request: &CancelFlowRunRequest) -> Result<(Uuid, SetStateRequest), ErrorData> {
    let flow_run_id = parse_uuid("flow_run_id", &request.flow_run_id)?;
    let body = SetStateRequest {
        state: StateCreate::cancelling(clean_text(request.message.as_deref())),
        force: request.force.unwrap_or(false),
    };
    Ok((flow_run_id, body))
}

type TimeBound<'a> = (&'a str, Option<&'a str>);

fn parse_time_range(after: TimeBound<'_>, before: TimeBound<'_>) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), ErrorData> {
    let (after_field, after_raw) = after;
    let (before_field, before_raw) = before;
    let after = parse_optional_timestamp(after_field, after_raw)?;
    let before = parse_optional_timestamp(before_field, before_raw)?;
    if let (Some(after), Some(before)) = (after, before)
        && after > before
    {
        return Err(invalid_params_error(
            "INVALID_TIME_RANGE",
            format!("{after_field} must not be later than {before_field}"),
            serde_json::json!({ after_field: after, before_field: before }),
            "Swap or widen the time range.",
        ));
    }
    Ok((after, before))
}

fn parse_optional_timestamp(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ErrorData> {
    let Some(raw) = clean_text(raw) else {
        return Ok(None);
    };
    parse_timestamp(&raw).map(Some).map_err(|error| {
        invalid_params_error(
            "INVALID_TIMESTAMP",
            format!("{field}: {error}"),
            serde_json::json!({ "field": field, "value": raw }),
            "Use an RFC 3339 timestamp such as 2024-05-01T00:00:00Z or a date such as 2024-05-01.",
        )
    })
}

/// Blank optional text is treated as absent.
fn clean_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

/// Trim list entries; an empty list is absent, a blank entry is an error.
fn clean_list(field: &str, values: Option<Vec<String>>) -> Result<Option<Vec<String>>, ErrorData> {
    let Some(values) = values else {
        return Ok(None);
    };
    let mut cleaned = Vec::with_capacity(values.len());
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(invalid_params_error(
                "BLANK_LIST_ENTRY",
                format!("{field} must not contain blank entries"),
                serde_json::json!({ "field": field }),
                "Remove empty strings from the list.",
            ));
        }
        cleaned.push(trimmed.to_string());
    }
    Ok((!cleaned.is_empty()).then_some(cleaned))
}

fn missing_argument(field: &str) -> ErrorData {
    invalid_params_error(
        "MISSING_ARGUMENT",
        format!("Missing required argument: {field}"),
        serde_json::json!({ "field": field }),
        "Provide the argument and call the tool again.",
    )
}

fn limit_not_integer(received: String) -> ErrorData {
    invalid_params_error(
        "INVALID_LIMIT",
        format!("limit must be a positive integer, got {received}"),
        serde_json::json!({ "field": "filter_criteria.limit", "value": received }),
        "Use a limit between 1 and 200.",
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prefect_mcp_types::{DeploymentStatus, FlowRunSort, StateType};
    use rmcp::model::ErrorCode;
    use serde_json::json;

    const FLOW_ID: &str = "9d7b5a3c-1e2f-4a6b-8c9d-0e1f2a3b4c5d";

    fn error_code(error: &ErrorData) -> String {
        error.data.as_ref().and_then(|data| data["error_code"].as_str()).unwrap_or_default().to_string()
    }

    #[test]
    fn list_query_applies_default_limit() {
        let query: FlowQuery = list_query(&ListRequest::default()).unwrap();
        assert_eq!(serde_json::to_value(&query).unwrap(), json!({ "limit": 20 }));
    }

    #[test]
    fn limit_out_of_range_is_invalid_params() {
        for limit in [0, 201, 5_000] {
            let request = ListRequest {
                limit: Some(limit),
                ..ListRequest::default()
            };
            let error = list_query::<()>(&request).unwrap_err();
            assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
            assert_eq!(error_code(&error), "INVALID_LIMIT");
        }
    }

    #[test]
    fn flow_search_maps_name_and_tags() {
        let request = SearchFlowsRequest {
            name_like: Some("etl".into()),
            tags: Some(vec![" prod ".into()]),
            limit: Some(5),
            ..SearchFlowsRequest::default()
        };
        assert_eq!(
            serde_json::to_value(flow_query(&request).unwrap()).unwrap(),
            json!({
                "flows": { "name": { "like_": "etl" }, "tags": { "all_": ["prod"] } },
                "limit": 5
            })
        );
    }

    #[test]
    fn flow_run_search_builds_nested_filters() {
        let request = SearchFlowRunsRequest {
            flow_name: Some("daily-etl".into()),
            flow_id: Some(FLOW_ID.into()),
            state_types: Some(vec![StateType::Failed, StateType::Crashed]),
            state_names: Some(vec!["Late".into()]),
            start_time_after: Some("2024-05-01".into()),
            start_time_before: Some("2024-05-02T12:00:00+02:00".into()),
            sort: Some(FlowRunSort::StartTimeDesc),
            offset: Some(40),
            ..SearchFlowRunsRequest::default()
        };
        assert_eq!(
            serde_json::to_value(flow_run_query(&request).unwrap()).unwrap(),
            json!({
                "flows": { "id": { "any_": [FLOW_ID] }, "name": { "any_": ["daily-etl"] } },
                "flow_runs": {
                    "state": { "type": { "any_": ["FAILED", "CRASHED"] }, "name": { "any_": ["Late"] } },
                    "start_time": { "after_": "2024-05-01T00:00:00Z", "before_": "2024-05-02T10:00:00Z" }
                },
                "sort": "START_TIME_DESC",
                "limit": 20,
                "offset": 40
            })
        );
    }

    #[test]
    fn flow_run_search_rejects_inverted_range() {
        let request = SearchFlowRunsRequest {
            start_time_after: Some("2024-05-03".into()),
            start_time_before: Some("2024-05-01".into()),
            ..SearchFlowRunsRequest::default()
        };
        assert_eq!(error_code(&flow_run_query(&request).unwrap_err()), "INVALID_TIME_RANGE");
    }

    #[test]
    fn flow_run_search_maps_expected_start_time() {
        let request = SearchFlowRunsRequest {
            state_types: Some(vec![StateType::Scheduled]),
            expected_start_time_after: Some("2024-06-01".into()),
            expected_start_time_before: Some("2024-06-02".into()),
            ..SearchFlowRunsRequest::default()
        };
        assert_eq!(
            serde_json::to_value(flow_run_query(&request).unwrap()).unwrap(),
            json!({
                "flow_runs": {
                    "state": { "type": { "any_": ["SCHEDULED"] } },
                    "expected_start_time": { "after_": "2024-06-01T00:00:00Z", "before_": "2024-06-02T00:00:00Z" }
                },
                "limit": 20
            })
        );

        let inverted = SearchFlowRunsRequest {
            expected_start_time_after: Some("2024-06-03".into()),
            expected_start_time_before: Some("2024-06-01".into()),
            ..SearchFlowRunsRequest::default()
        };
        let error = flow_run_query(&inverted).unwrap_err();
        assert_eq!(error_code(&error), "INVALID_TIME_RANGE");
        assert!(error.message.contains("expected_start_time_after"));
    }

    #[test]
    fn flow_run_search_rejects_bad_ids_and_timestamps() {
        let bad_id = SearchFlowRunsRequest {
            deployment_id: Some("nightly".into()),
            ..SearchFlowRunsRequest::default()
        };
        assert_eq!(error_code(&flow_run_query(&bad_id).unwrap_err()), "INVALID_ID");

        let bad_time = SearchFlowRunsRequest {
            start_time_after: Some("last tuesday".into()),
            ..SearchFlowRunsRequest::default()
        };
        assert_eq!(error_code(&flow_run_query(&bad_time).unwrap_err()), "INVALID_TIMESTAMP");
    }

    #[test]
    fn deployment_status_maps_to_paused_filter() {
        let request = SearchDeploymentsRequest {
            status: Some(DeploymentStatus::Paused),
            flow_name: Some("daily-etl".into()),
            work_queue_name: Some("default".into()),
            ..SearchDeploymentsRequest::default()
        };
        assert_eq!(
            serde_json::to_value(deployment_query(&request).unwrap()).unwrap(),
            json!({
                "flows": { "name": { "any_": ["daily-etl"] } },
                "deployments": {
                    "paused": { "eq_": true },
                    "work_queue_name": { "any_": ["default"] }
                },
                "limit": 20
            })
        );
    }

    #[test]
    fn blank_optional_text_is_ignored_but_blank_list_entries_are_rejected() {
        let request = SearchDeploymentsRequest {
            name: Some("   ".into()),
            ..SearchDeploymentsRequest::default()
        };
        assert_eq!(serde_json::to_value(deployment_query(&request).unwrap()).unwrap(), json!({ "limit": 20 }));

        let request = SearchDeploymentsRequest {
            tags: Some(vec!["ok".into(), " ".into()]),
            ..SearchDeploymentsRequest::default()
        };
        assert_eq!(error_code(&deployment_query(&request).unwrap_err()), "BLANK_LIST_ENTRY");
    }

    #[test]
    fn raw_filter_body_defaults_and_validates_limit() {
        let body = raw_filter_body(&json!({ "flows": { "tags": { "all_": ["production"] } } })).unwrap();
        assert_eq!(body, json!({ "flows": { "tags": { "all_": ["production"] } }, "limit": 20 }));

        assert_eq!(raw_filter_body(&json!({ "limit": 7 })).unwrap()["limit"], 7);
        assert_eq!(error_code(&raw_filter_body(&json!({ "limit": 0 })).unwrap_err()), "INVALID_LIMIT");
        assert_eq!(error_code(&raw_filter_body(&json!({ "limit": "ten" })).unwrap_err()), "INVALID_LIMIT");
        assert_eq!(error_code(&raw_filter_body(&json!({ "limit": -1 })).unwrap_err()), "INVALID_LIMIT");
        assert_eq!(
            error_code(&raw_filter_body(&json!(["flows"])).unwrap_err()),
            "INVALID_FILTER_CRITERIA"
        );
    }

    #[test]
    fn create_flow_run_requires_deployment_and_object_parameters() {
        let missing = CreateFlowRunRequest::default();
        let error = flow_run_create(&missing).unwrap_err();
        assert_eq!(error_code(&error), "MISSING_ARGUMENT");
        assert!(error.message.contains("deployment_id"));

        let bad_parameters = CreateFlowRunRequest {
            deployment_id: "daily-etl/prod".into(),
            parameters: Some(json!([1, 2])),
            ..CreateFlowRunRequest::default()
        };
        assert_eq!(error_code(&flow_run_create(&bad_parameters).unwrap_err()), "INVALID_PARAMETERS");
    }

    #[test]
    fn create_flow_run_builds_scheduled_body() {
        let request = CreateFlowRunRequest {
            deployment_id: "daily-etl/prod".into(),
            parameters: Some(json!({ "day": "2024-05-01" })),
            name: Some("backfill".into()),
            scheduled_start_time: Some("2030-01-01T00:00:00Z".into()),
            ..CreateFlowRunRequest::default()
        };
        let (deployment, body) = flow_run_create(&request).unwrap();
        assert_eq!(deployment.to_string(), "daily-etl/prod");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "parameters": { "day": "2024-05-01" },
                "name": "backfill",
                "state": {
                    "type": "SCHEDULED",
                    "name": "Scheduled",
                    "state_details": { "scheduled_time": "2030-01-01T00:00:00Z" }
                }
            })
        );
    }

    #[test]
    fn cancel_request_defaults_to_unforced() {
        let request = CancelFlowRunRequest {
            flow_run_id: FLOW_ID.into(),
            message: Some("  ".into()),
            ..CancelFlowRunRequest::default()
        };
        let (id, body) = cancel_request(&request).unwrap();
        assert_eq!(id.to_string(), FLOW_ID);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "state": { "type": "CANCELLING", "name": "Cancelling" }, "force": false })
        );
    }

    #[test]
    fn fields_validation() {
        let empty: Vec<String> = Vec::new();
        let named = vec!["name".to_string()];
        let blank = vec![String::new()];
        assert_eq!(validate_fields(None).unwrap(), None);
        assert_eq!(validate_fields(Some(empty.as_slice())).unwrap(), None);
        assert_eq!(validate_fields(Some(named.as_slice())).unwrap(), Some(named.clone()));
        assert!(validate_fields(Some(blank.as_slice())).is_err());
    }
}
