//! Logify configuration.
//!
//! Four options are recognized: the service name that tags every record,
//! the remote sink endpoint, the index namespace used on the remote
//! backend, and the minimum severity forwarded to any sink. They can be
//! built in code or loaded from environment variables.

use std::collections::HashMap;
use std::env;
use thiserror::Error;

use crate::record::Level;

/// Default remote sink endpoint.
pub const DEFAULT_REMOTE_SINK_ENDPOINT: &str = "http://localhost:9200";

/// Default index namespace on the remote backend.
pub const DEFAULT_INDEX_NAMESPACE: &str = "logify";

/// Characters the remote backend rejects in index names.
const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ' ', ':'];

/// Instrumentation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogifyConfig {
    /// Tags every record (`service` field). Required.
    pub service_name: String,

    /// Base URL of the remote search backend.
    pub remote_sink_endpoint: String,

    /// Index prefix on the remote backend.
    pub index_namespace: String,

    /// Records below this level are dropped before reaching any sink.
    pub minimum_severity: Level,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid service name: {0}")]
    InvalidServiceName(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid remote sink endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid index namespace: {0}")]
    InvalidIndexNamespace(String),
}

impl LogifyConfig {
    /// Configuration with defaults for everything but the service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            remote_sink_endpoint: DEFAULT_REMOTE_SINK_ENDPOINT.to_string(),
            index_namespace: DEFAULT_INDEX_NAMESPACE.to_string(),
            minimum_severity: Level::default(),
        }
    }

    #[must_use]
    pub fn with_remote_sink_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.remote_sink_endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_index_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.index_namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_minimum_severity(mut self, level: Level) -> Self {
        self.minimum_severity = level;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SERVICE_NAME` | required |
    /// | `ELASTICSEARCH_URL` | `http://localhost:9200` |
    /// | `LOG_INDEX_PREFIX` | `logify` |
    /// | `LOG_LEVEL` | `info` |
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let service_name = vars
            .get("SERVICE_NAME")
            .ok_or_else(|| ConfigError::MissingEnvVar("SERVICE_NAME".to_string()))?
            .clone();

        let remote_sink_endpoint = vars
            .get("ELASTICSEARCH_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_REMOTE_SINK_ENDPOINT.to_string());

        let index_namespace = vars
            .get("LOG_INDEX_PREFIX")
            .cloned()
            .unwrap_or_else(|| DEFAULT_INDEX_NAMESPACE.to_string());

        let minimum_severity = match vars.get("LOG_LEVEL") {
            Some(value) => value.parse().map_err(|_| {
                ConfigError::InvalidLogLevel(format!(
                    "LOG_LEVEL must be one of debug, info, warn, error, got '{}'",
                    value
                ))
            })?,
            None => Level::default(),
        };

        let config = Self {
            service_name,
            remote_sink_endpoint,
            index_namespace,
            minimum_severity,
        };
        config.validate()?;
        Ok(config)
    }

    /// Semantic checks on the values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::InvalidServiceName(
                "service name must not be empty".to_string(),
            ));
        }

        let endpoint = self.remote_sink_endpoint.as_str();
        let host = endpoint
            .strip_prefix("http://")
            .or_else(|| endpoint.strip_prefix("https://"))
            .ok_or_else(|| {
                ConfigError::InvalidEndpoint(format!(
                    "endpoint must start with http:// or https://, got '{}'",
                    endpoint
                ))
            })?;
        if host.trim_end_matches('/').is_empty() {
            return Err(ConfigError::InvalidEndpoint(format!(
                "endpoint has no host: '{}'",
                endpoint
            )));
        }

        let namespace = self.index_namespace.as_str();
        if namespace.is_empty()
            || namespace.starts_with(['-', '_', '+'])
            || namespace.contains(FORBIDDEN_INDEX_CHARS)
            || namespace.chars().any(char::is_uppercase)
        {
            return Err(ConfigError::InvalidIndexNamespace(format!(
                "index namespace must be non-empty lowercase without special characters, got '{}'",
                namespace
            )));
        }

        Ok(())
    }
}
