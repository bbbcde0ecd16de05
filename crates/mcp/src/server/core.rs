use std::sync::Arc;

use prefect_mcp_api::{ApiError, PrefectClient};
use prefect_mcp_types::{DeploymentQuery, DeploymentRef, FlowQuery, FlowRunQuery, OrchestrationStatus, ResourceKind};
use prefect_mcp_util::{project_records, redact_sensitive};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, ErrorData, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::server::errors::{api_error_result, rejected_transition_result};
use crate::server::queries::{
    cancel_request, deployment_query, flow_query, flow_run_create, flow_run_query, list_query, parse_deployment_ref, parse_uuid,
    raw_filter_body, validate_fields,
};
use crate::server::schemas::{
    CancelFlowRunRequest, CreateFlowRunRequest, DeploymentLookupRequest, FilterCriteriaRequest, FlowIdRequest, FlowRunIdRequest,
    ListRequest, SearchDeploymentsRequest, SearchFlowRunsRequest, SearchFlowsRequest,
};

const SERVER_INSTRUCTIONS: &str = "Tools for a Prefect workflow orchestration server.\n\
READ:\n\
- list_* returns recent records; search_* takes typed filters; filter_* forwards a raw Prefect filter body.\n\
- get_* fetches one record by id. Deployments may also be addressed as '<flow name>/<deployment name>'.\n\
- Use limit (1-200, default 20) and offset to page. Use fields to keep only the keys you need; 'id' is always kept.\n\
WRITE:\n\
- create_flow_run starts a run of a deployment, optionally with parameters and a scheduled_start_time.\n\
- cancel_flow_run asks the orchestrator to cancel a run. A refused transition is returned as an error with the orchestrator's reason.\n\
TIMES:\n\
- Timestamps accept RFC 3339 (2024-05-01T12:00:00Z) or plain dates (2024-05-01), interpreted as UTC.";

/// MCP tool handler backed by a shared Prefect API client.
#[derive(Clone)]
pub struct PrefectMcpCore {
    tool_router: ToolRouter<Self>,
    client: Arc<PrefectClient>,
}

#[tool_router]
impl PrefectMcpCore {
    pub fn new(client: Arc<PrefectClient>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            client,
        }
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "List flows registered with Prefect. Input: limit?, offset?, fields?. Returns {flows, count}."
    )]
    async fn list_flows(&self, param: Parameters<ListRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("list_flows", &param.0);
        let fields = validate_fields(param.0.fields.as_deref())?;
        let query: FlowQuery = list_query(&param.0)?;
        Ok(self.run_filter("list_flows", ResourceKind::Flow, &query, fields).await)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Get one flow by id. Input: flow_id (UUID)."
    )]
    async fn get_flow(&self, param: Parameters<FlowIdRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("get_flow", &param.0);
        let id = parse_uuid("flow_id", &param.0.flow_id)?;
        Ok(self.run_read("get_flow", ResourceKind::Flow, id).await)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Search flows. Input: name? (exact), name_like? (substring), tags? (all must match), sort?, limit?, offset?, fields?. Returns {flows, count}."
    )]
    async fn search_flows(&self, param: Parameters<SearchFlowsRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("search_flows", &param.0);
        let fields = validate_fields(param.0.fields.as_deref())?;
        let query = flow_query(&param.0)?;
        Ok(self.run_filter("search_flows", ResourceKind::Flow, &query, fields).await)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Run POST /flows/filter with a raw Prefect filter body. Input: filter_criteria (object), fields?. A missing limit defaults to 20."
    )]
    async fn filter_flows(&self, param: Parameters<FilterCriteriaRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("filter_flows", &param.0);
        let fields = validate_fields(param.0.fields.as_deref())?;
        let body = raw_filter_body(&param.0.filter_criteria)?;
        Ok(self.run_filter("filter_flows", ResourceKind::Flow, &body, fields).await)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "List flow runs. Input: limit?, offset?, fields?. Returns {flow_runs, count}."
    )]
    async fn list_flow_runs(&self, param: Parameters<ListRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("list_flow_runs", &param.0);
        let fields = validate_fields(param.0.fields.as_deref())?;
        let query: FlowRunQuery = list_query(&param.0)?;
        Ok(self.run_filter("list_flow_runs", ResourceKind::FlowRun, &query, fields).await)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Get one flow run by id, including its current state. Input: flow_run_id (UUID)."
    )]
    async fn get_flow_run(&self, param: Parameters<FlowRunIdRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("get_flow_run", &param.0);
        let id = parse_uuid("flow_run_id", &param.0.flow_run_id)?;
        Ok(self.run_read("get_flow_run", ResourceKind::FlowRun, id).await)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Search flow runs. Input: name_like?, flow_name?, flow_id?, deployment_id?, state_types? (e.g. FAILED, CRASHED), state_names?, tags?, start_time_after?, start_time_before?, expected_start_time_after?, expected_start_time_before?, sort?, limit?, offset?, fields?. Returns {flow_runs, count}."
    )]
    async fn search_flow_runs(&self, param: Parameters<SearchFlowRunsRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("search_flow_runs", &param.0);
        let fields = validate_fields(param.0.fields.as_deref())?;
        let query = flow_run_query(&param.0)?;
        Ok(self.run_filter("search_flow_runs", ResourceKind::FlowRun, &query, fields).await)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Run POST /flow_runs/filter with a raw Prefect filter body. Input: filter_criteria (object), fields?. A missing limit defaults to 20."
    )]
    async fn filter_flow_runs(&self, param: Parameters<FilterCriteriaRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("filter_flow_runs", &param.0);
        let fields = validate_fields(param.0.fields.as_deref())?;
        let body = raw_filter_body(&param.0.filter_criteria)?;
        Ok(self.run_filter("filter_flow_runs", ResourceKind::FlowRun, &body, fields).await)
    }

    #[tool(
        annotations(open_world_hint = true),
        description = "Create a flow run from a deployment. Input: deployment_id (UUID or '<flow>/<deployment>'), parameters? (object), name?, tags?, scheduled_start_time?. Returns {flow_run_id, flow_run}."
    )]
    async fn create_flow_run(&self, param: Parameters<CreateFlowRunRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("create_flow_run", &param.0);
        let (reference, body) = flow_run_create(&param.0)?;

        let deployment_id = match self.resolve_deployment_id(&reference).await {
            Ok(id) => id,
            Err(error) => return Ok(api_error_result("create_flow_run", &error)),
        };

        let flow_run = match self.client.create_flow_run(deployment_id, &body).await {
            Ok(flow_run) => flow_run,
            Err(error) => return Ok(api_error_result("create_flow_run", &error)),
        };
        let Some(flow_run_id) = flow_run.get("id").filter(|id| id.is_string()).cloned() else {
            let error = ApiError::UnexpectedShape {
                url: format!("{}/deployments/{deployment_id}/create_flow_run", self.client.base_url()),
                reason: "created flow run has no id".to_string(),
            };
            return Ok(api_error_result("create_flow_run", &error));
        };
        Ok(CallToolResult::structured(serde_json::json!({
            "flow_run_id": flow_run_id,
            "flow_run": flow_run,
        })))
    }

    #[tool(
        annotations(destructive_hint = true, open_world_hint = true),
        description = "Cancel a flow run by proposing a Cancelling state. Input: flow_run_id (UUID), force? (default false), message?. A transition the orchestrator refuses is returned as an error."
    )]
    async fn cancel_flow_run(&self, param: Parameters<CancelFlowRunRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("cancel_flow_run", &param.0);
        let (flow_run_id, body) = cancel_request(&param.0)?;

        let result = match self.client.set_flow_run_state(flow_run_id, &body).await {
            Ok(result) => result,
            Err(error) => return Ok(api_error_result("cancel_flow_run", &error)),
        };

        let payload = serde_json::json!({
            "flow_run_id": flow_run_id,
            "status": result.status,
            "state": result.state,
            "details": result.details,
        });
        if result.is_accepted() {
            return Ok(CallToolResult::structured(payload));
        }
        let status = serde_json::to_value(result.status).unwrap_or(Value::Null);
        Ok(rejected_transition_result(
            format!("Prefect did not accept the cancellation of flow run {flow_run_id} (status {status})"),
            payload,
            result.status == OrchestrationStatus::Wait,
        ))
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "List deployments. Input: limit?, offset?, fields?. Returns {deployments, count}."
    )]
    async fn list_deployments(&self, param: Parameters<ListRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("list_deployments", &param.0);
        let fields = validate_fields(param.0.fields.as_deref())?;
        let query: DeploymentQuery = list_query(&param.0)?;
        Ok(self.run_filter("list_deployments", ResourceKind::Deployment, &query, fields).await)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Get one deployment. Input: deployment_id (UUID or '<flow name>/<deployment name>')."
    )]
    async fn get_deployment(&self, param: Parameters<DeploymentLookupRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("get_deployment", &param.0);
        let reference = parse_deployment_ref("deployment_id", &param.0.deployment_id)?;
        match self.client.read_deployment(&reference).await {
            Ok(record) => Ok(record_result(record)),
            Err(error) => Ok(api_error_result("get_deployment", &error)),
        }
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Search deployments. Input: name?, name_like?, flow_name?, tags?, status? (active|paused), work_queue_name?, sort?, limit?, offset?, fields?. Returns {deployments, count}."
    )]
    async fn search_deployments(&self, param: Parameters<SearchDeploymentsRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("search_deployments", &param.0);
        let fields = validate_fields(param.0.fields.as_deref())?;
        let query = deployment_query(&param.0)?;
        Ok(self.run_filter("search_deployments", ResourceKind::Deployment, &query, fields).await)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Run POST /deployments/filter with a raw Prefect filter body. Input: filter_criteria (object), fields?. A missing limit defaults to 20."
    )]
    async fn filter_deployments(&self, param: Parameters<FilterCriteriaRequest>) -> Result<CallToolResult, ErrorData> {
        self.log_call("filter_deployments", &param.0);
        let fields = validate_fields(param.0.fields.as_deref())?;
        let body = raw_filter_body(&param.0.filter_criteria)?;
        Ok(self.run_filter("filter_deployments", ResourceKind::Deployment, &body, fields).await)
    }

    async fn run_filter<B: Serialize + ?Sized>(
        &self,
        tool_name: &str,
        kind: ResourceKind,
        body: &B,
        fields: Option<Vec<String>>,
    ) -> CallToolResult {
        match self.client.filter(kind, body).await {
            Ok(records) => collection_result(kind, records, fields.as_deref()),
            Err(error) => api_error_result(tool_name, &error),
        }
    }

    async fn run_read(&self, tool_name: &str, kind: ResourceKind, id: Uuid) -> CallToolResult {
        match self.client.read(kind, id).await {
            Ok(record) => record_result(record),
            Err(error) => api_error_result(tool_name, &error),
        }
    }

    async fn resolve_deployment_id(&self, reference: &DeploymentRef) -> Result<Uuid, ApiError> {
        if let DeploymentRef::Id(id) = reference {
            return Ok(*id);
        }
        let deployment = self.client.read_deployment(reference).await?;
        deployment
            .get("id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or_else(|| ApiError::UnexpectedShape {
                url: format!("{}/deployments/name/{reference}", self.client.base_url()),
                reason: "deployment record has no usable id".to_string(),
            })
    }

    fn log_call<P: Serialize>(&self, tool_name: &str, params: &P) {
        let params = serde_json::to_string(params).unwrap_or_default();
        debug!(tool = tool_name, params = %redact_sensitive(&params), "tool call");
    }
}

/// Wrap filter results as `{"<collection>": [...], "count": n}`.
fn collection_result(kind: ResourceKind, records: Vec<Value>, fields: Option<&[String]>) -> CallToolResult {
    let records = match fields {
        Some(fields) => project_records(records, fields),
        None => records,
    };
    let mut payload = Map::new();
    payload.insert("count".to_string(), Value::from(records.len()));
    payload.insert(kind.collection().to_string(), Value::Array(records));
    CallToolResult::structured(Value::Object(payload))
}

/// Structured content must be an object; anything else is wrapped.
fn record_result(record: Value) -> CallToolResult {
    match record {
        Value::Object(_) => CallToolResult::structured(record),
        other => CallToolResult::structured(serde_json::json!({ "result": other })),
    }
}

#[tool_handler]
impl ServerHandler for PrefectMcpCore {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "prefect".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Prefect MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
        }
    }
}
