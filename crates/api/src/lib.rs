//! Prefect API client utilities.
//!
//! This crate provides a lightweight client for the Prefect REST API. It
//! focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Reading `PREFECT_API_URL` and `PREFECT_API_KEY` (see [`config`])
//! - Issuing the handful of calls the MCP tools need and turning every
//!   failure mode into an [`ApiError`]
//!
//! The primary entry point is [`PrefectClient`].
//!
//! # Example
//!
//! ```ignore
//! use prefect_mcp_api::{ClientConfig, PrefectClient};
//! use prefect_mcp_types::{FlowQuery, Limit, ResourceKind};
//!
//! let client = PrefectClient::new(&ClientConfig::from_env()?)?;
//! let flows = client.filter(ResourceKind::Flow, &FlowQuery::new(Limit::default())).await?;
//! ```

pub mod config;
mod error;

use std::env;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use prefect_mcp_types::{DeploymentRef, FlowRunCreate, OrchestrationResult, ResourceKind, SetStateRequest};
use prefect_mcp_util::http::parse_response_json_strict;
use prefect_mcp_util::redact_sensitive;
use reqwest::{Client, Method, RequestBuilder, header};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

pub use config::{ClientConfig, ConfigError, ConfigSources};
pub use error::ApiError;

/// Characters escaped when a user-supplied name becomes a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for Prefect API access.
///
/// Default headers carry the bearer token (when configured) and request JSON.
/// Cloning is cheap; clones share the connection pool.
pub struct PrefectClient {
    base_url: String,
    http: Client,
    user_agent: String,
}

impl PrefectClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut default_headers = header::HeaderMap::new();
        if let Some(api_key) = config.api_key() {
            let mut authorization = header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| ConfigError::InvalidApiKey)?;
            authorization.set_sensitive(true);
            default_headers.insert(header::AUTHORIZATION, authorization);
        }
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            base_url: config.api_url(),
            http,
            user_agent: format!("prefect-mcp/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run `POST /<collection>/filter` and return the matching records.
    pub async fn filter<B: Serialize + ?Sized>(&self, kind: ResourceKind, body: &B) -> Result<Vec<Value>, ApiError> {
        let path = format!("/{}/filter", kind.collection());
        let value = self.send(Method::POST, &path, Some(body)).await?;
        match value {
            Value::Array(records) => Ok(records),
            other => Err(ApiError::UnexpectedShape {
                url: self.url_for(&path),
                reason: format!("expected an array of {} records, got {}", kind.label(), json_type_name(&other)),
            }),
        }
    }

    /// Run `GET /<collection>/{id}`.
    pub async fn read(&self, kind: ResourceKind, id: Uuid) -> Result<Value, ApiError> {
        let path = format!("/{}/{id}", kind.collection());
        self.send::<()>(Method::GET, &path, None).await
    }

    /// Look a deployment up by id or by `<flow>/<deployment>` name.
    pub async fn read_deployment(&self, reference: &DeploymentRef) -> Result<Value, ApiError> {
        match reference {
            DeploymentRef::Id(id) => self.read(ResourceKind::Deployment, *id).await,
            DeploymentRef::Name {
                flow_name,
                deployment_name,
            } => {
                let path = format!(
                    "/deployments/name/{}/{}",
                    utf8_percent_encode(flow_name, PATH_SEGMENT),
                    utf8_percent_encode(deployment_name, PATH_SEGMENT)
                );
                self.send::<()>(Method::GET, &path, None).await
            }
        }
    }

    /// Run `POST /deployments/{id}/create_flow_run` and return the new flow run.
    pub async fn create_flow_run(&self, deployment_id: Uuid, body: &FlowRunCreate) -> Result<Value, ApiError> {
        let path = format!("/deployments/{deployment_id}/create_flow_run");
        self.send(Method::POST, &path, Some(body)).await
    }

    /// Propose a new state for a flow run.
    pub async fn set_flow_run_state(&self, flow_run_id: Uuid, body: &SetStateRequest) -> Result<OrchestrationResult, ApiError> {
        let path = format!("/flow_runs/{flow_run_id}/set_state");
        let value = self.send(Method::POST, &path, Some(body)).await?;
        serde_json::from_value(value).map_err(|error| ApiError::UnexpectedShape {
            url: self.url_for(&path),
            reason: format!("not an orchestration result: {error}"),
        })
    }

    /// `GET /health`; Prefect answers `true` when the server is up.
    pub async fn health(&self) -> Result<Value, ApiError> {
        self.send::<()>(Method::GET, "/health", None).await
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url_for(path);
        debug!(%method, %url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    async fn send<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Value, ApiError> {
        let url = self.url_for(path);
        let mut builder = self.request(method.clone(), path);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|source| {
            warn!(%method, %url, error = %source, "prefect request failed");
            ApiError::Request { url: url.clone(), source }
        })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ApiError::Request { url: url.clone(), source })?;

        if !status.is_success() {
            let body = redact_sensitive(&text);
            warn!(%method, %url, status = status.as_u16(), body = %body, "prefect returned an error status");
            return Err(ApiError::Status {
                method: method.to_string(),
                url,
                status,
                body,
            });
        }

        parse_response_json_strict(&text, Some(status)).map_err(|source| ApiError::InvalidResponse { url, source })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn rejects_api_key_that_cannot_be_a_header() {
        let config = ClientConfig::new("http://localhost:4200/api", Some("bad\nkey".to_string()), Duration::from_secs(1)).unwrap();
        assert!(matches!(PrefectClient::new(&config), Err(ConfigError::InvalidApiKey)));
    }

    #[test]
    fn path_segments_escape_separators() {
        let encoded = utf8_percent_encode("team a/b?", PATH_SEGMENT).to_string();
        assert_eq!(encoded, "team%20a%2Fb%3F");
    }
}
