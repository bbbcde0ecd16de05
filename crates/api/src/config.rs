//! Client configuration resolved from CLI flags and the environment.

use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;
use url::Url;

pub const API_URL_ENV: &str = "PREFECT_API_URL";
pub const API_KEY_ENV: &str = "PREFECT_API_KEY";
pub const TIMEOUT_ENV: &str = "PREFECT_MCP_TIMEOUT_SECS";

/// Address of a local Prefect server started with `prefect server start`.
pub const DEFAULT_API_URL: &str = "http://localhost:4200/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Hostnames allowed to receive an API key over plain HTTP.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PREFECT_API_URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("PREFECT_API_URL must use http or https; got '{scheme}://'")]
    UnsupportedScheme { scheme: String },

    #[error("refusing to send PREFECT_API_KEY over plain http to non-local host '{host}'; use https")]
    InsecureApiKey { host: String },

    #[error("PREFECT_API_KEY contains characters that are not valid in an HTTP header")]
    InvalidApiKey,

    #[error("Invalid PREFECT_MCP_TIMEOUT_SECS '{value}': expected a positive number of seconds")]
    InvalidTimeout { value: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Raw, unvalidated configuration values.
///
/// Empty strings count as unset, so `PREFECT_API_KEY=` disables
/// authentication rather than sending an empty bearer token.
#[derive(Clone, Default)]
pub struct ConfigSources {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: Option<String>,
}

impl ConfigSources {
    pub fn from_env() -> Self {
        Self {
            api_url: read_env(API_URL_ENV),
            api_key: read_env(API_KEY_ENV),
            timeout_secs: read_env(TIMEOUT_ENV),
        }
    }

    /// Fill every unset value from `fallback`.
    pub fn or(self, fallback: ConfigSources) -> Self {
        Self {
            api_url: non_empty(self.api_url).or(fallback.api_url),
            api_key: non_empty(self.api_key).or(fallback.api_key),
            timeout_secs: non_empty(self.timeout_secs).or(fallback.timeout_secs),
        }
    }
}

impl fmt::Debug for ConfigSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSources")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Validated configuration for [`crate::PrefectClient`].
#[derive(Clone)]
pub struct ClientConfig {
    api_url: Url,
    api_key: Option<String>,
    timeout: Duration,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_sources(ConfigSources::from_env())
    }

    pub fn from_sources(sources: ConfigSources) -> Result<Self, ConfigError> {
        let api_url = non_empty(sources.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_key = non_empty(sources.api_key);
        let timeout = match non_empty(sources.timeout_secs) {
            Some(value) => parse_timeout(&value)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        Self::new(&api_url, api_key, timeout)
    }

    pub fn new(api_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let api_url = validate_base_url(api_url, api_key.is_some())?;
        Ok(Self {
            api_url,
            api_key,
            timeout,
        })
    }

    /// Base URL without a trailing slash, ready for `format!("{base}{path}")`.
    pub fn api_url(&self) -> String {
        self.api_url.as_str().trim_end_matches('/').to_string()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - must parse and include a host
/// - scheme must be `http` or `https`
/// - with an API key configured, `http` is only allowed for local hosts
fn validate_base_url(base: &str, has_api_key: bool) -> Result<Url, ConfigError> {
    let parsed = Url::parse(base.trim()).map_err(|error| ConfigError::InvalidUrl {
        url: base.to_string(),
        reason: error.to_string(),
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::UnsupportedScheme { scheme: scheme.to_string() });
    }

    let host = parsed.host_str().ok_or_else(|| ConfigError::InvalidUrl {
        url: base.to_string(),
        reason: "URL must include a host".to_string(),
    })?;

    let is_local = LOCALHOST_DOMAINS.iter().any(|&allowed| host.eq_ignore_ascii_case(allowed));
    if has_api_key && scheme == "http" && !is_local {
        return Err(ConfigError::InsecureApiKey { host: host.to_string() });
    }

    Ok(parsed)
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|seconds| *seconds > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidTimeout { value: value.to_string() })
}

fn read_env(name: &str) -> Option<String> {
    non_empty(env::var(name).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|raw| raw.trim().to_string()).filter(|trimmed| !trimmed.is_empty())
}
