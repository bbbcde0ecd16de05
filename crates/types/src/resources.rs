use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// The three resource collections the server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Flow,
    FlowRun,
    Deployment,
}

impl ResourceKind {
    /// Path segment of the collection, which doubles as the key of tool results.
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Flow => "flows",
            ResourceKind::FlowRun => "flow_runs",
            ResourceKind::Deployment => "deployments",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Flow => "flow",
            ResourceKind::FlowRun => "flow run",
            ResourceKind::Deployment => "deployment",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A deployment addressed either by id or by `<flow name>/<deployment name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentRef {
    Id(Uuid),
    Name { flow_name: String, deployment_name: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{input}' is neither a deployment id nor a '<flow name>/<deployment name>' pair")]
pub struct DeploymentRefError {
    pub input: String,
}

impl FromStr for DeploymentRef {
    type Err = DeploymentRefError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if let Ok(id) = Uuid::parse_str(trimmed) {
            return Ok(DeploymentRef::Id(id));
        }
        let (flow_name, deployment_name) = trimmed.split_once('/').ok_or_else(|| DeploymentRefError {
            input: input.to_string(),
        })?;
        let (flow_name, deployment_name) = (flow_name.trim(), deployment_name.trim());
        if flow_name.is_empty() || deployment_name.is_empty() || deployment_name.contains('/') {
            return Err(DeploymentRefError { input: input.to_string() });
        }
        Ok(DeploymentRef::Name {
            flow_name: flow_name.to_string(),
            deployment_name: deployment_name.to_string(),
        })
    }
}

impl fmt::Display for DeploymentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentRef::Id(id) => write!(f, "{id}"),
            DeploymentRef::Name {
                flow_name,
                deployment_name,
            } => write!(f, "{flow_name}/{deployment_name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_uuid_reference() {
        let parsed: DeploymentRef = "  6f1e7c4a-2b0d-4c55-9d1e-0a8f5b4e2c11 ".parse().unwrap();
        assert_eq!(
            parsed,
            DeploymentRef::Id(Uuid::parse_str("6f1e7c4a-2b0d-4c55-9d1e-0a8f5b4e2c11").unwrap())
        );
    }

    #[test]
    fn parses_name_reference() {
        let parsed: DeploymentRef = "etl-flow/nightly".parse().unwrap();
        assert_eq!(
            parsed,
            DeploymentRef::Name {
                flow_name: "etl-flow".to_string(),
                deployment_name: "nightly".to_string()
            }
        );
        assert_eq!(parsed.to_string(), "etl-flow/nightly");
    }

    #[test]
    fn rejects_malformed_references() {
        for input in ["", "nightly", "/nightly", "etl/", "a/b/c", "1234"] {
            assert!(input.parse::<DeploymentRef>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn collection_segments() {
        assert_eq!(ResourceKind::FlowRun.collection(), "flow_runs");
        assert_eq!(ResourceKind::Deployment.to_string(), "deployment");
    }
}
