//! Client configuration with TOML file support.

use ballotlink_gateway::GatewayConfig;
use ballotlink_types::Environment;
use serde::{Deserialize, Serialize};

use crate::{ClientError, LogFormat};

/// Configuration for a voting client.
///
/// Can be loaded from a TOML file via [`ClientConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default, so an
/// empty document is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Which deployment to use; selects the bootnode entry.
    #[serde(default)]
    pub environment: Environment,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How many times to ask for revealed keys before giving up on a
    /// results digest.
    #[serde(default = "default_key_poll_attempts")]
    pub key_poll_attempts: u32,

    /// Blocks to wait between two key polls.
    #[serde(default = "default_key_poll_wait_blocks")]
    pub key_poll_wait_blocks: u64,

    #[serde(default)]
    pub gateway: GatewayConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

fn default_key_poll_attempts() -> u32 {
    3
}

fn default_key_poll_wait_blocks() -> u64 {
    2
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ClientError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ClientError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ClientError> {
        toml::from_str(s).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ClientError> {
        toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            key_poll_attempts: default_key_poll_attempts(),
            key_poll_wait_blocks: default_key_poll_wait_blocks(),
            gateway: GatewayConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ClientConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = ClientConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.environment, Environment::Prod);
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.key_poll_attempts, 3);
        assert_eq!(config.gateway.request_timeout_ms, 15_000);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            environment = "stg"
            log_format = "json"

            [gateway]
            pool_size = 3
            bootnodes_uri = "https://bootnodes.example.org/gateways.json"

            [gateway.error_policy]
            transient_patterns = ["timeout"]
        "#;
        let config = ClientConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.environment, Environment::Stg);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.gateway.pool_size, 3);
        assert_eq!(config.gateway.error_policy.transient_patterns, vec!["timeout"]);
        assert!(config.gateway.error_policy.is_skipped("getRoot")); // default
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "key_poll_attempts = 7").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let config = ClientConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.key_poll_attempts, 7);
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = ClientConfig::from_toml_file("/nonexistent/ballotlink.toml");
        assert!(matches!(result, Err(ClientError::Config(_))));
    }
}
