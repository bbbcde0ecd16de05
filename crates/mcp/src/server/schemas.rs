use prefect_mcp_types::{DeploymentSort, DeploymentStatus, FlowRunSort, FlowSort, StateType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Paging and projection shared by the `list_*` tools.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ListRequest {
    #[schemars(description = "Maximum number of records to return (1-200, default 20).")]
    pub limit: Option<u64>,
    #[schemars(description = "Number of records to skip, for paging.")]
    pub offset: Option<u64>,
    #[schemars(description = "Optional top-level fields to keep in each record, for example ['name', 'state_type']. 'id' is always kept.")]
    pub fields: Option<Vec<String>>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FlowIdRequest {
    #[schemars(description = "Flow id (UUID).")]
    #[serde(default)]
    pub flow_id: String,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FlowRunIdRequest {
    #[schemars(description = "Flow run id (UUID).")]
    #[serde(default)]
    pub flow_run_id: String,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DeploymentLookupRequest {
    #[schemars(description = "Deployment id (UUID) or '<flow name>/<deployment name>'.")]
    #[serde(default)]
    pub deployment_id: String,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchFlowsRequest {
    #[schemars(description = "Exact flow name.")]
    pub name: Option<String>,
    #[schemars(description = "Case-insensitive substring of the flow name.")]
    pub name_like: Option<String>,
    #[schemars(description = "Tags every returned flow must carry.")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Sort order, for example NAME_ASC or CREATED_DESC.")]
    pub sort: Option<FlowSort>,
    #[schemars(description = "Maximum number of records to return (1-200, default 20).")]
    pub limit: Option<u64>,
    #[schemars(description = "Number of records to skip, for paging.")]
    pub offset: Option<u64>,
    #[schemars(description = "Optional top-level fields to keep in each record. 'id' is always kept.")]
    pub fields: Option<Vec<String>>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchFlowRunsRequest {
    #[schemars(description = "Case-insensitive substring of the flow run name.")]
    pub name_like: Option<String>,
    #[schemars(description = "Only runs of the flow with this exact name.")]
    pub flow_name: Option<String>,
    #[schemars(description = "Only runs of the flow with this id (UUID).")]
    pub flow_id: Option<String>,
    #[schemars(description = "Only runs created from this deployment id (UUID).")]
    pub deployment_id: Option<String>,
    #[schemars(description = "State types to match, for example ['FAILED', 'CRASHED'].")]
    pub state_types: Option<Vec<StateType>>,
    #[schemars(description = "State names to match, for example ['Late', 'AwaitingRetry'].")]
    pub state_names: Option<Vec<String>>,
    #[schemars(description = "Tags every returned run must carry.")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Only runs that started at or after this time (RFC 3339 or YYYY-MM-DD).")]
    pub start_time_after: Option<String>,
    #[schemars(description = "Only runs that started at or before this time (RFC 3339 or YYYY-MM-DD).")]
    pub start_time_before: Option<String>,
    #[schemars(description = "Only runs expected to start at or after this time, including runs that are still scheduled.")]
    pub expected_start_time_after: Option<String>,
    #[schemars(description = "Only runs expected to start at or before this time (RFC 3339 or YYYY-MM-DD).")]
    pub expected_start_time_before: Option<String>,
    #[schemars(description = "Sort order, for example START_TIME_DESC or EXPECTED_START_TIME_ASC.")]
    pub sort: Option<FlowRunSort>,
    #[schemars(description = "Maximum number of records to return (1-200, default 20).")]
    pub limit: Option<u64>,
    #[schemars(description = "Number of records to skip, for paging.")]
    pub offset: Option<u64>,
    #[schemars(description = "Optional top-level fields to keep in each record. 'id' is always kept.")]
    pub fields: Option<Vec<String>>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchDeploymentsRequest {
    #[schemars(description = "Exact deployment name.")]
    pub name: Option<String>,
    #[schemars(description = "Case-insensitive substring of the deployment name.")]
    pub name_like: Option<String>,
    #[schemars(description = "Only deployments of the flow with this exact name.")]
    pub flow_name: Option<String>,
    #[schemars(description = "Tags every returned deployment must carry.")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "'active' for deployments with running schedules, 'paused' for paused ones.")]
    pub status: Option<DeploymentStatus>,
    #[schemars(description = "Only deployments that submit to this work queue.")]
    pub work_queue_name: Option<String>,
    #[schemars(description = "Sort order, for example NAME_ASC or UPDATED_DESC.")]
    pub sort: Option<DeploymentSort>,
    #[schemars(description = "Maximum number of records to return (1-200, default 20).")]
    pub limit: Option<u64>,
    #[schemars(description = "Number of records to skip, for paging.")]
    pub offset: Option<u64>,
    #[schemars(description = "Optional top-level fields to keep in each record. 'id' is always kept.")]
    pub fields: Option<Vec<String>>,
}

/// Raw filter body forwarded to a `/<collection>/filter` endpoint.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FilterCriteriaRequest {
    #[schemars(
        description = "Filter body in Prefect API form, for example {\"flow_runs\": {\"state\": {\"type\": {\"any_\": [\"FAILED\"]}}}, \"limit\": 10}."
    )]
    pub filter_criteria: Value,
    #[schemars(description = "Optional top-level fields to keep in each record. 'id' is always kept.")]
    pub fields: Option<Vec<String>>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CreateFlowRunRequest {
    #[schemars(description = "Deployment id (UUID) or '<flow name>/<deployment name>'.")]
    #[serde(default)]
    pub deployment_id: String,
    #[schemars(description = "Flow parameters as a JSON object. Omitted parameters use the deployment defaults.")]
    pub parameters: Option<Value>,
    #[schemars(description = "Optional flow run name. Prefect generates one when omitted.")]
    pub name: Option<String>,
    #[schemars(description = "Tags added to the flow run.")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Schedule the run for this time (RFC 3339 or YYYY-MM-DD) instead of now.")]
    pub scheduled_start_time: Option<String>,
}

#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CancelFlowRunRequest {
    #[schemars(description = "Flow run id (UUID).")]
    #[serde(default)]
    pub flow_run_id: String,
    #[schemars(description = "Bypass orchestration rules that would otherwise reject the cancellation.")]
    pub force: Option<bool>,
    #[schemars(description = "Optional message recorded on the Cancelling state.")]
    pub message: Option<String>,
}
