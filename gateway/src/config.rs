//! Gateway pool configuration.

use serde::{Deserialize, Serialize};

use crate::GatewayError;

/// A gateway known before discovery, from configuration or a bootnode
/// document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayCandidate {
    pub uri: String,

    /// Web3 endpoint of the anchoring chain served next to this gateway.
    #[serde(default, alias = "chainRpc", skip_serializing_if = "Option::is_none")]
    pub chain_rpc: Option<String>,

    /// Hex ed25519 key responses must be signed with. Without it responses
    /// are accepted unsigned.
    #[serde(default, alias = "publicKey", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    /// Methods the gateway is expected to serve. Replaced by the `getInfo`
    /// answer during discovery.
    #[serde(default)]
    pub methods: Vec<String>,
}

impl GatewayCandidate {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            chain_rpc: None,
            public_key: None,
            methods: Vec::new(),
        }
    }
}

/// How the pool reacts to a failed request, by method and error text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPolicy {
    /// Lookups where "not found" is an expected answer: errors are returned
    /// without rotating.
    #[serde(default = "default_skip_methods")]
    pub skip_methods: Vec<String>,

    /// Methods that build state on one gateway across several calls. They
    /// are never replayed elsewhere.
    #[serde(default = "default_sequential_methods")]
    pub sequential_methods: Vec<String>,

    /// Case-insensitive substrings marking an error as transient.
    #[serde(default = "default_transient_patterns")]
    pub transient_patterns: Vec<String>,
}

fn default_skip_methods() -> Vec<String> {
    vec!["getRoot".to_string()]
}

fn default_sequential_methods() -> Vec<String> {
    vec!["addClaimBulk".to_string(), "publishCensus".to_string()]
}

fn default_transient_patterns() -> Vec<String> {
    [
        "timeout",
        "timed out",
        "connection reset",
        "connection refused",
        "connection failed",
        "not supported",
        "census not found",
        "unavailable",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl ErrorPolicy {
    pub fn is_skipped(&self, method: &str) -> bool {
        self.skip_methods.iter().any(|m| m == method)
    }

    pub fn is_sequential(&self, method: &str) -> bool {
        self.sequential_methods.iter().any(|m| m == method)
    }

    /// Whether `error` should rotate the pool. Timeouts always do; remote
    /// and transport failures do when their message matches a pattern. The
    /// method name and gateway URI are never matched.
    pub fn is_transient(&self, error: &GatewayError) -> bool {
        let text = match error {
            GatewayError::Timeout { .. } => return true,
            GatewayError::Remote { message, .. } => message,
            GatewayError::Transport(text) => text,
            _ => return false,
        };
        let text = text.to_lowercase();
        self.transient_patterns
            .iter()
            .any(|p| text.contains(&p.to_lowercase()))
    }
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self {
            skip_methods: default_skip_methods(),
            sequential_methods: default_sequential_methods(),
            transient_patterns: default_transient_patterns(),
        }
    }
}

/// Where gateways come from and how the pool treats them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// URI of a bootnode document listing gateways per environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootnodes_uri: Option<String>,

    /// Number of ranked gateways kept in the pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Consecutive failures tolerated before the pool gives up.
    #[serde(default = "default_max_error_count")]
    pub max_error_count: u32,

    /// Gateways probed in addition to the bootnode list.
    #[serde(default)]
    pub candidates: Vec<GatewayCandidate>,

    #[serde(default)]
    pub error_policy: ErrorPolicy,
}

fn default_pool_size() -> usize {
    5
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_max_error_count() -> u32 {
    5
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bootnodes_uri: None,
            pool_size: default_pool_size(),
            request_timeout_ms: default_request_timeout_ms(),
            max_error_count: default_max_error_count(),
            candidates: Vec::new(),
            error_policy: ErrorPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config, GatewayConfig::default());
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.max_error_count, 5);
        assert!(config.error_policy.is_skipped("getRoot"));
        assert!(config.error_policy.is_sequential("publishCensus"));
    }

    #[test]
    fn candidates_accept_camel_case_keys() {
        let config: GatewayConfig = toml::from_str(
            r#"
            pool_size = 2

            [[candidates]]
            uri = "https://gw1.example.org/dvote"
            chainRpc = "https://gw1.example.org/web3"
            publicKey = "0x00"
            methods = ["getInfo", "submitRawTx"]
            "#,
        )
        .unwrap();
        assert_eq!(config.pool_size, 2);
        let c = &config.candidates[0];
        assert_eq!(c.chain_rpc.as_deref(), Some("https://gw1.example.org/web3"));
        assert_eq!(c.methods.len(), 2);
    }

    #[test]
    fn transient_matching_is_case_insensitive() {
        let policy = ErrorPolicy::default();
        let remote = |message: &str| GatewayError::Remote {
            method: "getProofs".into(),
            message: message.into(),
        };
        assert!(policy.is_transient(&remote("Census Not Found")));
        assert!(policy.is_transient(&remote("method NOT SUPPORTED")));
        assert!(!policy.is_transient(&remote("invalid vote")));
        assert!(policy.is_transient(&GatewayError::Timeout {
            uri: "x".into(),
            ms: 1
        }));
        assert!(policy.is_transient(&GatewayError::Transport(
            "connection refused".into()
        )));
        assert!(!policy.is_transient(&GatewayError::Codec("bad json".into())));
    }

    #[test]
    fn method_and_uri_are_not_matched() {
        let policy = ErrorPolicy::default();
        assert!(!policy.is_transient(&GatewayError::Remote {
            method: "getUnavailableKeys".into(),
            message: "invalid process id".into(),
        }));
        assert!(!policy.is_transient(&GatewayError::InvalidSignature(
            "https://unavailable.example.org/dvote".into()
        )));
        assert!(!policy.is_transient(&GatewayError::Codec("request timed out".into())));
    }

    #[test]
    fn patterns_are_configurable() {
        let policy = ErrorPolicy {
            transient_patterns: vec!["try again".into()],
            ..ErrorPolicy::default()
        };
        assert!(policy.is_transient(&GatewayError::Remote {
            method: "m".into(),
            message: "please TRY AGAIN".into(),
        }));
        assert!(!policy.is_transient(&GatewayError::Transport("connection refused".into())));
    }
}
