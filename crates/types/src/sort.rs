//! Sort orders accepted by the Prefect filter endpoints.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowSort {
    CreatedDesc,
    UpdatedDesc,
    NameAsc,
    NameDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowRunSort {
    IdDesc,
    StartTimeAsc,
    StartTimeDesc,
    ExpectedStartTimeAsc,
    ExpectedStartTimeDesc,
    NameAsc,
    NameDesc,
    NextScheduledStartTimeAsc,
    EndTimeDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentSort {
    CreatedDesc,
    UpdatedDesc,
    NameAsc,
    NameDesc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_word_variants_serialize_with_underscores() {
        assert_eq!(
            serde_json::to_value(FlowRunSort::NextScheduledStartTimeAsc).unwrap(),
            serde_json::json!("NEXT_SCHEDULED_START_TIME_ASC")
        );
        assert_eq!(serde_json::to_value(FlowSort::CreatedDesc).unwrap(), serde_json::json!("CREATED_DESC"));
        assert_eq!(serde_json::to_value(DeploymentSort::NameAsc).unwrap(), serde_json::json!("NAME_ASC"));
    }
}
