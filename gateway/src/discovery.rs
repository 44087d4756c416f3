//! Finding and ranking gateways.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use ballotlink_types::Environment;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::{GatewayCandidate, GatewayConfig};
use crate::handle::GatewayHandle;
use crate::pool::exchange_once;
use crate::transport::GatewayTransport;
use crate::wire::GatewayRequest;
use crate::GatewayError;

#[derive(Debug, Deserialize)]
struct BootnodeEntry {
    #[serde(default)]
    gateways: Vec<GatewayCandidate>,
}

/// Extract the gateways listed for `environment` in a bootnode document:
/// `{"<environment>": {"gateways": [{"uri", "chainRpc", "publicKey", "methods"}]}}`.
pub fn parse_bootnodes(
    bytes: &[u8],
    environment: Environment,
) -> Result<Vec<GatewayCandidate>, GatewayError> {
    let mut document: BTreeMap<String, BootnodeEntry> = serde_json::from_slice(bytes)?;
    document
        .remove(environment.as_str())
        .map(|entry| entry.gateways)
        .ok_or_else(|| {
            GatewayError::Discovery(format!("bootnode document has no `{environment}` entry"))
        })
}

/// Probe every candidate with `getInfo` and rank the ones that answer by
/// health, then latency.
pub async fn discover_gateways(
    config: &GatewayConfig,
    environment: Environment,
    transport: Arc<dyn GatewayTransport>,
) -> Result<Vec<GatewayHandle>, GatewayError> {
    let timeout = config.request_timeout();
    let mut candidates = config.candidates.clone();
    if let Some(uri) = &config.bootnodes_uri {
        let document = transport.fetch(uri, timeout).await?;
        candidates.extend(parse_bootnodes(&document, environment)?);
    }

    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert(c.uri.clone()));
    if candidates.is_empty() {
        return Err(GatewayError::Discovery("no gateway candidates".into()));
    }
    let total = candidates.len();

    let mut handles = Vec::with_capacity(total);
    for candidate in &candidates {
        let gateway = match GatewayHandle::from_candidate(candidate, environment) {
            Ok(gateway) => gateway,
            Err(e) => {
                warn!(gateway = %candidate.uri, error = %e, "skipping gateway candidate");
                continue;
            }
        };
        let transport = transport.clone();
        handles.push(tokio::spawn(async move {
            let uri = gateway.uri.clone();
            (uri, probe(transport, gateway, timeout).await)
        }));
    }

    let mut healthy = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok((_, Ok(gateway))) => {
                debug!(gateway = %gateway.uri, health = gateway.health, latency_ms = gateway.latency.as_millis() as u64, "gateway probed");
                healthy.push(gateway);
            }
            Ok((uri, Err(e))) => warn!(gateway = %uri, error = %e, "gateway probe failed"),
            Err(e) => warn!(error = %e, "gateway probe task failed"),
        }
    }

    if healthy.is_empty() {
        return Err(GatewayError::Discovery(format!(
            "none of {total} gateway candidates is healthy"
        )));
    }

    healthy.sort_by(|a, b| b.health.cmp(&a.health).then(a.latency.cmp(&b.latency)));
    healthy.truncate(config.pool_size.max(1));
    info!(
        environment = %environment,
        candidates = total,
        selected = healthy.len(),
        "gateway discovery finished"
    );
    Ok(healthy)
}

async fn probe(
    transport: Arc<dyn GatewayTransport>,
    mut gateway: GatewayHandle,
    timeout: Duration,
) -> Result<GatewayHandle, GatewayError> {
    let started = Instant::now();
    let response = exchange_once(
        transport.as_ref(),
        &gateway,
        &GatewayRequest::new("getInfo"),
        None,
        timeout,
    )
    .await?;
    gateway.latency = started.elapsed();
    gateway.health = response.field("health")?;
    if let Some(methods) = response.field_opt::<Vec<String>>("apiList")? {
        gateway.methods = methods.into_iter().collect();
    }
    Ok(gateway)
}
