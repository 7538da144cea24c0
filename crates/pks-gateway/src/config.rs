//! Gateway configuration from environment variables

use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

use crate::adapters::PKS_ADAPTER_PATH;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Runtime configuration of the gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Human-readable name reported by `/ready`
    pub gateway_name: Option<String>,
    pub port: u16,
    pub log_level: Level,
    /// Upper bound on a single connectivity check
    pub connect_timeout: Duration,
    /// Adapter path the orchestrator delegates connectivity checks to
    pub adapter_path: String,
    /// PostgreSQL connection string; the memory store is used when absent
    pub database_url: Option<String>,
    /// Register the HTTP reachability adapter at startup
    pub http_adapter: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            gateway_name: None,
            port: DEFAULT_PORT,
            log_level: Level::INFO,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            adapter_path: PKS_ADAPTER_PATH.to_string(),
            database_url: None,
            http_adapter: false,
        }
    }
}

impl GatewayConfig {
    /// Read the configuration from `PKS_GATEWAY_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PKS_GATEWAY_PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PKS_GATEWAY_PORT",
                expected: "a valid port number",
                value,
            })?,
            None => defaults.port,
        };

        // Unknown levels fall back to info
        let log_level = lookup("PKS_GATEWAY_LOG_LEVEL")
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.log_level);

        let connect_timeout = match lookup("PKS_GATEWAY_CONNECT_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: "PKS_GATEWAY_CONNECT_TIMEOUT_SECS",
                        expected: "a positive number of seconds",
                        value,
                    })
                }
            },
            None => defaults.connect_timeout,
        };

        let http_adapter = match lookup("PKS_GATEWAY_HTTP_ADAPTER") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue {
                name: "PKS_GATEWAY_HTTP_ADAPTER",
                expected: "a boolean flag",
                value,
            })?,
            None => defaults.http_adapter,
        };

        Ok(Self {
            gateway_name: lookup("PKS_GATEWAY_NAME").filter(|name| !name.is_empty()),
            port,
            log_level,
            connect_timeout,
            adapter_path: defaults.adapter_path,
            database_url: lookup("PKS_GATEWAY_DATABASE_URL").filter(|url| !url.is_empty()),
            http_adapter,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.adapter_path, "/adapters/pks-service");
        assert!(config.database_url.is_none());
        assert!(!config.http_adapter);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PKS_GATEWAY_PORT", "9090"),
            ("PKS_GATEWAY_LOG_LEVEL", "debug"),
            ("PKS_GATEWAY_NAME", "edge"),
            ("PKS_GATEWAY_CONNECT_TIMEOUT_SECS", "3"),
            ("PKS_GATEWAY_HTTP_ADAPTER", "Yes"),
        ])
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.gateway_name.as_deref(), Some("edge"));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert!(config.http_adapter);
    }

    #[test]
    fn test_invalid_values() {
        let err = config(&[("PKS_GATEWAY_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().starts_with("PKS_GATEWAY_PORT must be"));

        assert!(config(&[("PKS_GATEWAY_CONNECT_TIMEOUT_SECS", "0")]).is_err());
        assert!(config(&[("PKS_GATEWAY_HTTP_ADAPTER", "maybe")]).is_err());
    }

    #[test]
    fn test_unknown_log_level_falls_back() {
        let config = config(&[("PKS_GATEWAY_LOG_LEVEL", "chatty")]).unwrap();
        assert_eq!(config.log_level, Level::INFO);
    }
}
