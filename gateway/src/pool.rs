//! The rotating gateway pool.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use ballotlink_types::{Environment, KeyPair, Timestamp};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::GatewayConfig;
use crate::discovery::discover_gateways;
use crate::handle::GatewayHandle;
use crate::transport::GatewayTransport;
use crate::wire::{new_request_id, GatewayRequest, GatewayResponse};
use crate::GatewayError;

/// One request/response exchange with `gateway`, bounded by `timeout`.
///
/// An `ok: false` answer is returned as [`GatewayError::Remote`].
pub(crate) async fn exchange_once(
    transport: &dyn GatewayTransport,
    gateway: &GatewayHandle,
    request: &GatewayRequest,
    signer: Option<&KeyPair>,
    timeout: Duration,
) -> Result<GatewayResponse, GatewayError> {
    let id = new_request_id();
    let body = request.encode(&id, Timestamp::now(), signer)?;

    debug!(gateway = %gateway.uri, method = request.method(), %id, "gateway request");

    let bytes = tokio::time::timeout(timeout, transport.exchange(&gateway.uri, body, timeout))
        .await
        .map_err(|_| GatewayError::Timeout {
            uri: gateway.uri.clone(),
            ms: timeout.as_millis() as u64,
        })??;

    let response = GatewayResponse::decode(&bytes, &id, gateway.public_key.as_ref(), &gateway.uri)?;
    if !response.ok() {
        return Err(GatewayError::Remote {
            method: request.method().to_string(),
            message: response.message().unwrap_or("unknown error").to_string(),
        });
    }
    Ok(response)
}

struct PoolState {
    gateways: VecDeque<GatewayHandle>,
    /// Consecutive failures since the last success.
    error_count: u32,
}

impl PoolState {
    /// Move the head to the tail, unless the failure budget is spent.
    fn shift(&mut self, max_error_count: u32) -> Result<(), GatewayError> {
        if self.error_count > max_error_count || self.error_count as usize >= self.gateways.len() {
            let attempts = self.error_count;
            self.error_count = 0;
            return Err(GatewayError::PoolExhausted { attempts });
        }
        self.gateways.rotate_left(1);
        Ok(())
    }

    /// Charge a failure of `uri` and rotate it away.
    ///
    /// A no-op when `uri` is no longer the head: a concurrent caller already
    /// rotated past it.
    fn fail(&mut self, uri: &str, max_error_count: u32) -> Result<(), GatewayError> {
        if self.gateways.front().map(|g| g.uri.as_str()) != Some(uri) {
            return Ok(());
        }
        self.error_count += 1;
        self.shift(max_error_count)
    }
}

/// Ordered set of redundant gateways. Requests go to the head; transient
/// failures rotate it to the tail.
///
/// Owned by the caller and shared by reference. The ordering and the
/// failure counter sit behind one mutex; network I/O runs outside it.
pub struct GatewayPool {
    transport: Arc<dyn GatewayTransport>,
    config: GatewayConfig,
    environment: Environment,
    state: Mutex<PoolState>,
}

impl GatewayPool {
    /// Discover, probe and rank gateways, keeping the best
    /// `config.pool_size`.
    pub async fn discover(
        config: GatewayConfig,
        environment: Environment,
        transport: Arc<dyn GatewayTransport>,
    ) -> Result<Self, GatewayError> {
        let gateways = discover_gateways(&config, environment, transport.clone()).await?;
        Self::with_gateways(config, environment, transport, gateways)
    }

    /// Build a pool from already ranked gateways.
    pub fn with_gateways(
        config: GatewayConfig,
        environment: Environment,
        transport: Arc<dyn GatewayTransport>,
        gateways: Vec<GatewayHandle>,
    ) -> Result<Self, GatewayError> {
        if gateways.is_empty() {
            return Err(GatewayError::Discovery("no gateways for the pool".into()));
        }
        info!(
            environment = %environment,
            size = gateways.len(),
            head = %gateways[0].uri,
            "gateway pool ready"
        );
        Ok(Self {
            transport,
            config,
            environment,
            state: Mutex::new(PoolState {
                gateways: gateways.into(),
                error_count: 0,
            }),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send `request` to the head gateway, rotating on transient failures.
    ///
    /// - A head that does not advertise the method counts as a failure.
    /// - Skip-list methods return their error without rotating.
    /// - Sequential-state methods never rotate; their error is fatal.
    /// - Errors matching the transient patterns rotate and retry until the
    ///   pool is exhausted. Anything else is returned as is.
    /// - Callers failing on the same head rotate it once between them.
    pub async fn send(
        &self,
        request: &GatewayRequest,
        signer: Option<&KeyPair>,
        timeout: Option<Duration>,
    ) -> Result<GatewayResponse, GatewayError> {
        let method = request.method();
        let policy = &self.config.error_policy;
        let timeout = timeout.unwrap_or_else(|| self.config.request_timeout());

        loop {
            let head = self.head().await?;

            if !head.supports(method) {
                warn!(gateway = %head.uri, method, "gateway does not serve method, rotating");
                self.fail_and_shift(&head.uri).await?;
                continue;
            }

            match exchange_once(self.transport.as_ref(), &head, request, signer, timeout).await {
                Ok(response) => {
                    self.state.lock().await.error_count = 0;
                    return Ok(response);
                }
                Err(err) if policy.is_sequential(method) => {
                    return Err(GatewayError::SequentialState {
                        method: method.to_string(),
                        source: Box::new(err),
                    });
                }
                Err(err) if policy.is_skipped(method) => return Err(err),
                Err(err) if policy.is_transient(&err) => {
                    warn!(gateway = %head.uri, method, error = %err, "transient gateway failure, rotating");
                    self.fail_and_shift(&head.uri).await?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Move the head gateway to the tail.
    pub async fn shift(&self) -> Result<(), GatewayError> {
        self.state.lock().await.shift(self.config.max_error_count)
    }

    /// Re-run discovery and replace the pool contents.
    pub async fn refresh(&self) -> Result<(), GatewayError> {
        let gateways =
            discover_gateways(&self.config, self.environment, self.transport.clone()).await?;
        let mut state = self.state.lock().await;
        info!(size = gateways.len(), "gateway pool refreshed");
        state.gateways = gateways.into();
        state.error_count = 0;
        Ok(())
    }

    /// Current head gateway.
    pub async fn head(&self) -> Result<GatewayHandle, GatewayError> {
        self.state
            .lock()
            .await
            .gateways
            .front()
            .cloned()
            .ok_or_else(|| GatewayError::Discovery("gateway pool is empty".into()))
    }

    /// Gateways in their current order, head first.
    pub async fn gateways(&self) -> Vec<GatewayHandle> {
        self.state.lock().await.gateways.iter().cloned().collect()
    }

    pub async fn error_count(&self) -> u32 {
        self.state.lock().await.error_count
    }

    async fn fail_and_shift(&self, uri: &str) -> Result<(), GatewayError> {
        self.state
            .lock()
            .await
            .fail(uri, self.config.max_error_count)
    }
}
