use std::time::Duration;

use prefect_mcp_api::{ApiError, ClientConfig, PrefectClient};
use prefect_mcp_types::{
    DeploymentRef, FlowRunCreate, FlowRunFilter, FlowRunQuery, Limit, OrchestrationStatus, ResourceKind, SetStateRequest, StateCreate,
    StateType,
};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FLOW_RUN_ID: &str = "0b6a5f8e-3c1d-4e2f-9a7b-1c2d3e4f5a6b";
const DEPLOYMENT_ID: &str = "6f1e7c4a-2b0d-4c55-9d1e-0a8f5b4e2c11";

async fn setup(api_key: Option<&str>) -> (MockServer, PrefectClient) {
    let mock_server = MockServer::start().await;
    let config = ClientConfig::new(
        &format!("{}/api/", mock_server.uri()),
        api_key.map(str::to_string),
        Duration::from_secs(5),
    )
    .expect("mock server url is valid");
    let client = PrefectClient::new(&config).expect("client builds");
    (mock_server, client)
}

#[tokio::test]
async fn filter_posts_body_and_returns_records() {
    let (mock_server, client) = setup(Some("pnu_test")).await;

    Mock::given(method("POST"))
        .and(path("/api/flow_runs/filter"))
        .and(header("authorization", "Bearer pnu_test"))
        .and(body_json(json!({
            "flow_runs": { "state": { "type": { "any_": ["FAILED"] } } },
            "limit": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": FLOW_RUN_ID, "name": "brave-otter" }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = FlowRunQuery::new(Limit::new(3).unwrap()).with_flow_runs(FlowRunFilter::default().with_state_types(vec![StateType::Failed]));
    let records = client.filter(ResourceKind::FlowRun, &query).await.expect("filter succeeds");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "brave-otter");
}

#[tokio::test]
async fn non_success_status_becomes_status_error() {
    let (mock_server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path(format!("/api/flow_runs/{FLOW_RUN_ID}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Flow run not found" })))
        .mount(&mock_server)
        .await;

    let error = client
        .read(ResourceKind::FlowRun, Uuid::parse_str(FLOW_RUN_ID).unwrap())
        .await
        .unwrap_err();

    match &error {
        ApiError::Status { status, body, method, .. } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(method, "GET");
            assert!(body.contains("Flow run not found"), "{body}");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(!error.is_retryable());
}

#[tokio::test]
async fn server_errors_are_retryable() {
    let (mock_server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let error = client.health().await.unwrap_err();
    assert_eq!(error.status().map(|status| status.as_u16()), Some(503));
    assert!(error.is_retryable());
}

#[tokio::test]
async fn malformed_json_is_reported() {
    let (mock_server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/api/flows/filter"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let error = client.filter(ResourceKind::Flow, &json!({ "limit": 20 })).await.unwrap_err();
    assert!(matches!(error, ApiError::InvalidResponse { .. }), "{error:?}");
}

#[tokio::test]
async fn filter_rejects_non_array_payload() {
    let (mock_server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/api/deployments/filter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&mock_server)
        .await;

    let error = client.filter(ResourceKind::Deployment, &json!({ "limit": 20 })).await.unwrap_err();
    match error {
        ApiError::UnexpectedShape { reason, .. } => assert!(reason.contains("an object"), "{reason}"),
        other => panic!("expected shape error, got {other:?}"),
    }
}

#[tokio::test]
async fn deployment_names_are_path_encoded() {
    let (mock_server, client) = setup(None).await;

    Mock::given(method("GET"))
        .and(path("/api/deployments/name/daily%20etl/prod"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": DEPLOYMENT_ID, "name": "prod" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reference: DeploymentRef = "daily etl/prod".parse().unwrap();
    let deployment = client.read_deployment(&reference).await.expect("lookup succeeds");
    assert_eq!(deployment["id"], DEPLOYMENT_ID);
}

#[tokio::test]
async fn create_flow_run_posts_to_deployment() {
    let (mock_server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(path(format!("/api/deployments/{DEPLOYMENT_ID}/create_flow_run")))
        .and(body_json(json!({ "parameters": { "date": "2024-05-01" } })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": FLOW_RUN_ID, "state_type": "SCHEDULED" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut body = FlowRunCreate::default();
    body.parameters.insert("date".to_string(), json!("2024-05-01"));
    let flow_run = client
        .create_flow_run(Uuid::parse_str(DEPLOYMENT_ID).unwrap(), &body)
        .await
        .expect("create succeeds");
    assert_eq!(flow_run["id"], FLOW_RUN_ID);
}

#[tokio::test]
async fn set_state_parses_orchestration_result() {
    let (mock_server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(path(format!("/api/flow_runs/{FLOW_RUN_ID}/set_state")))
        .and(body_json(json!({
            "state": { "type": "CANCELLING", "name": "Cancelling" },
            "force": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": "ACCEPT",
            "details": {},
            "state": { "type": "CANCELLING", "name": "Cancelling" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let request = SetStateRequest {
        state: StateCreate::cancelling(None),
        force: true,
    };
    let result = client
        .set_flow_run_state(Uuid::parse_str(FLOW_RUN_ID).unwrap(), &request)
        .await
        .expect("set_state succeeds");
    assert_eq!(result.status, OrchestrationStatus::Accept);
    assert!(result.is_accepted());
}

#[tokio::test]
async fn connection_failures_are_request_errors() {
    let config = ClientConfig::new("http://127.0.0.1:9/api", None, Duration::from_secs(2)).unwrap();
    let client = PrefectClient::new(&config).unwrap();

    let error = client.health().await.unwrap_err();
    assert!(matches!(error, ApiError::Request { .. }), "{error:?}");
    assert!(error.is_retryable());
}
