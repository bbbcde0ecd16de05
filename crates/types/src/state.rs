use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Prefect state types as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateType {
    Scheduled,
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    Crashed,
    Paused,
    Cancelling,
}

impl StateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateType::Scheduled => "SCHEDULED",
            StateType::Pending => "PENDING",
            StateType::Running => "RUNNING",
            StateType::Completed => "COMPLETED",
            StateType::Failed => "FAILED",
            StateType::Cancelled => "CANCELLED",
            StateType::Crashed => "CRASHED",
            StateType::Paused => "PAUSED",
            StateType::Cancelling => "CANCELLING",
        }
    }

    /// Display name Prefect assigns to a state of this type when none is given.
    pub fn default_name(&self) -> &'static str {
        match self {
            StateType::Scheduled => "Scheduled",
            StateType::Pending => "Pending",
            StateType::Running => "Running",
            StateType::Completed => "Completed",
            StateType::Failed => "Failed",
            StateType::Cancelled => "Cancelled",
            StateType::Crashed => "Crashed",
            StateType::Paused => "Paused",
            StateType::Cancelling => "Cancelling",
        }
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schedule status of a deployment.
///
/// Prefect models this as the boolean `paused` attribute; `active` selects
/// deployments whose schedules are running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Active,
    Paused,
}

impl DeploymentStatus {
    pub fn is_paused(self) -> bool {
        matches!(self, DeploymentStatus::Paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_type_uses_upper_case_wire_names() {
        assert_eq!(serde_json::to_value(StateType::Cancelling).unwrap(), serde_json::json!("CANCELLING"));
        let parsed: StateType = serde_json::from_value(serde_json::json!("CRASHED")).unwrap();
        assert_eq!(parsed, StateType::Crashed);
        assert_eq!(StateType::Crashed.to_string(), "CRASHED");
    }

    #[test]
    fn rejects_lower_case_state_type() {
        assert!(serde_json::from_value::<StateType>(serde_json::json!("failed")).is_err());
    }

    #[test]
    fn deployment_status_maps_to_paused_flag() {
        assert!(DeploymentStatus::Paused.is_paused());
        assert!(!DeploymentStatus::Active.is_paused());
        let parsed: DeploymentStatus = serde_json::from_value(serde_json::json!("active")).unwrap();
        assert_eq!(parsed, DeploymentStatus::Active);
    }
}
