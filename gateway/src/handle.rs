use std::collections::BTreeSet;
use std::time::Duration;

use ballotlink_types::{Environment, PublicKey};

use crate::config::GatewayCandidate;
use crate::GatewayError;

/// A gateway in the pool: where it lives, how to authenticate its answers
/// and what it serves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayHandle {
    pub uri: String,
    pub chain_rpc: Option<String>,
    pub public_key: Option<PublicKey>,
    pub methods: BTreeSet<String>,
    /// Network the gateway was discovered for.
    pub environment: Environment,
    /// Self-reported health from the last probe, higher is better.
    pub health: u32,
    /// Round trip of the last probe.
    pub latency: Duration,
}

impl GatewayHandle {
    pub fn from_candidate(
        candidate: &GatewayCandidate,
        environment: Environment,
    ) -> Result<Self, GatewayError> {
        let public_key = candidate
            .public_key
            .as_deref()
            .map(PublicKey::from_hex)
            .transpose()
            .map_err(|e| {
                GatewayError::Discovery(format!("bad public key for {}: {e}", candidate.uri))
            })?;
        Ok(Self {
            uri: candidate.uri.clone(),
            chain_rpc: candidate.chain_rpc.clone(),
            public_key,
            methods: candidate.methods.iter().cloned().collect(),
            environment,
            health: 0,
            latency: Duration::ZERO,
        })
    }

    /// Whether the gateway advertises `method`.
    pub fn supports(&self, method: &str) -> bool {
        self.methods.contains(method)
    }
}
