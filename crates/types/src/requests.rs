//! Mutation payloads and the orchestration result returned for state changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::StateType;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StateDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<DateTime<Utc>>,
}

/// A proposed state for a flow run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateCreate {
    #[serde(rename = "type")]
    pub state_type: StateType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_details: Option<StateDetails>,
}

impl StateCreate {
    /// The state Prefect's own tooling proposes when a user cancels a run.
    pub fn cancelling(message: Option<String>) -> Self {
        Self {
            state_type: StateType::Cancelling,
            name: Some(StateType::Cancelling.default_name().to_string()),
            message,
            state_details: None,
        }
    }

    pub fn scheduled_at(scheduled_time: DateTime<Utc>) -> Self {
        Self {
            state_type: StateType::Scheduled,
            name: Some(StateType::Scheduled.default_name().to_string()),
            message: None,
            state_details: Some(StateDetails {
                scheduled_time: Some(scheduled_time),
            }),
        }
    }
}

/// Body of `POST /flow_runs/{id}/set_state`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetStateRequest {
    pub state: StateCreate,
    pub force: bool,
}

/// Body of `POST /deployments/{id}/create_flow_run`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowRunCreate {
    pub parameters: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<StateCreate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrchestrationStatus {
    Accept,
    Reject,
    Abort,
    Wait,
}

/// Response to a proposed state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub status: OrchestrationStatus,
    #[serde(default)]
    pub details: Value,
    #[serde(default)]
    pub state: Option<Value>,
}

impl OrchestrationResult {
    pub fn is_accepted(&self) -> bool {
        self.status == OrchestrationStatus::Accept
    }
}
