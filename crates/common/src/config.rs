//! Service configuration.
//!
//! Loaded from environment variables. The instrumentation settings are
//! delegated to [`LogifyConfig::from_vars`], with `SERVICE_NAME`
//! defaulting to the service's own name.

use logify::{ConfigError, LogifyConfig};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Default fault injection rate (disabled).
pub const DEFAULT_FAILURE_RATE: f64 = 0.0;

/// Values that differ per service binary.
#[derive(Debug, Clone, Copy)]
pub struct ServiceDefaults {
    pub name: &'static str,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Server bind address (default: "0.0.0.0:<port>").
    pub bind_address: String,

    /// Probability in `[0, 1]` that a handler injects a simulated failure.
    pub failure_rate: f64,

    /// Per-request timeout applied below the instrumentation layers.
    pub request_timeout_seconds: u64,

    pub logify: LogifyConfig,
}

#[derive(Debug, Error)]
pub enum ServiceConfigError {
    #[error(transparent)]
    Logify(#[from] ConfigError),

    #[error("Invalid failure rate: {0}")]
    InvalidFailureRate(String),

    #[error("Invalid request timeout: {0}")]
    InvalidRequestTimeout(String),
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env(defaults: ServiceDefaults) -> Result<Self, ServiceConfigError> {
        Self::from_vars(&env::vars().collect(), defaults)
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(
        vars: &HashMap<String, String>,
        defaults: ServiceDefaults,
    ) -> Result<Self, ServiceConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| format!("0.0.0.0:{}", defaults.port));

        let failure_rate = match vars.get("FAILURE_RATE") {
            Some(value) => {
                let rate: f64 = value.parse().map_err(|e| {
                    ServiceConfigError::InvalidFailureRate(format!(
                        "FAILURE_RATE must be a number, got '{}': {}",
                        value, e
                    ))
                })?;
                if !(0.0..=1.0).contains(&rate) {
                    return Err(ServiceConfigError::InvalidFailureRate(format!(
                        "FAILURE_RATE must be between 0 and 1, got {}",
                        rate
                    )));
                }
                rate
            }
            None => DEFAULT_FAILURE_RATE,
        };

        let request_timeout_seconds = match vars.get("REQUEST_TIMEOUT_SECONDS") {
            Some(value) => {
                let seconds: u64 = value.parse().map_err(|e| {
                    ServiceConfigError::InvalidRequestTimeout(format!(
                        "REQUEST_TIMEOUT_SECONDS must be a positive integer, got '{}': {}",
                        value, e
                    ))
                })?;
                if seconds == 0 {
                    return Err(ServiceConfigError::InvalidRequestTimeout(
                        "REQUEST_TIMEOUT_SECONDS must be greater than 0".to_string(),
                    ));
                }
                seconds
            }
            None => DEFAULT_REQUEST_TIMEOUT_SECONDS,
        };

        let mut logify_vars = vars.clone();
        logify_vars
            .entry("SERVICE_NAME".to_string())
            .or_insert_with(|| defaults.name.to_string());
        let logify = LogifyConfig::from_vars(&logify_vars)?;

        Ok(Self {
            bind_address,
            failure_rate,
            request_timeout_seconds,
            logify,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use logify::Level;

    const ORDERS: ServiceDefaults = ServiceDefaults {
        name: "order-service",
        port: 3003,
    };

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_vars(&HashMap::new(), ORDERS).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3003");
        assert_eq!(config.failure_rate, 0.0);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.logify.service_name, "order-service");
        assert_eq!(config.logify.minimum_severity, Level::Info);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_vars(
            &vars(&[
                ("BIND_ADDRESS", "127.0.0.1:9000"),
                ("FAILURE_RATE", "0.25"),
                ("REQUEST_TIMEOUT_SECONDS", "5"),
                ("SERVICE_NAME", "orders"),
                ("LOG_LEVEL", "warn"),
                ("LOG_INDEX_PREFIX", "logify-orders"),
            ]),
            ORDERS,
        )
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.failure_rate, 0.25);
        assert_eq!(config.request_timeout_seconds, 5);
        assert_eq!(config.logify.service_name, "orders");
        assert_eq!(config.logify.minimum_severity, Level::Warn);
        assert_eq!(config.logify.index_namespace, "logify-orders");
    }

    #[test]
    fn test_failure_rate_out_of_range_rejected() {
        for value in ["1.5", "-0.1", "often"] {
            let result = ServiceConfig::from_vars(&vars(&[("FAILURE_RATE", value)]), ORDERS);
            assert!(
                matches!(result, Err(ServiceConfigError::InvalidFailureRate(_))),
                "FAILURE_RATE={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result =
            ServiceConfig::from_vars(&vars(&[("REQUEST_TIMEOUT_SECONDS", "0")]), ORDERS);
        assert!(matches!(
            result,
            Err(ServiceConfigError::InvalidRequestTimeout(_))
        ));
    }

    #[test]
    fn test_logify_errors_are_propagated() {
        let result = ServiceConfig::from_vars(&vars(&[("LOG_LEVEL", "loud")]), ORDERS);
        assert!(matches!(
            result,
            Err(ServiceConfigError::Logify(ConfigError::InvalidLogLevel(_)))
        ));
    }
}
