//! The voting protocol client.

use std::sync::Arc;
use std::time::Duration;

use ballotlink_chain::{
    block_at_time, time_at_block, BlockStatus, ChainCall, ChainError, ChainProvider,
    NewProcessParams, NOMINAL_BLOCK_TIME_MS,
};
use ballotlink_crypto::derive_address;
use ballotlink_envelope::{ProcessKey, SignedTx, Tx, VoteEnvelope};
use ballotlink_gateway::{GatewayError, GatewayPool, GatewayRequest, GatewayResponse};
use ballotlink_types::{
    Availability, KeyPair, Nullifier, ProcessId, ProcessStatus, Timestamp,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::metadata::ProcessMetadata;
use crate::results::{digest_results, DigestedResults};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::state::{EnvelopeStatus, ProcessState};
use crate::storage::{fetch_content, pinned_origin, ContentStorage};
use crate::{ClientConfig, ClientError};

/// Encryption keys of a process. Private keys appear once revealed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessKeys {
    pub encryption_pub_keys: Vec<ProcessKey>,
    pub encryption_priv_keys: Vec<ProcessKey>,
}

/// Raw counters: one row per question, one counter per choice value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResults {
    pub results: Vec<Vec<u128>>,
    /// Gateway's description of the results, e.g. `"ended"`.
    pub state: Option<String>,
    pub height: u64,
}

/// Client for the voting protocol, over a caller-owned gateway pool.
pub struct VotingProtocolClient {
    pool: Arc<GatewayPool>,
    chain: Arc<dyn ChainProvider>,
    storage: Arc<dyn ContentStorage>,
    sleeper: Arc<dyn Sleeper>,
    key_poll_attempts: u32,
    key_poll_wait: Duration,
}

impl VotingProtocolClient {
    pub fn new(
        pool: Arc<GatewayPool>,
        chain: Arc<dyn ChainProvider>,
        storage: Arc<dyn ContentStorage>,
    ) -> Self {
        let defaults = ClientConfig::default();
        Self {
            pool,
            chain,
            storage,
            sleeper: Arc::new(TokioSleeper),
            key_poll_attempts: defaults.key_poll_attempts,
            key_poll_wait: blocks(defaults.key_poll_wait_blocks),
        }
    }

    /// Apply the results polling settings of `config`.
    pub fn with_config(mut self, config: &ClientConfig) -> Self {
        self.key_poll_attempts = config.key_poll_attempts.max(1);
        self.key_poll_wait = blocks(config.key_poll_wait_blocks);
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn pool(&self) -> &GatewayPool {
        &self.pool
    }

    async fn call(&self, request: GatewayRequest) -> Result<GatewayResponse, ClientError> {
        Ok(self.pool.send(&request, None, None).await?)
    }

    // ── Process lifecycle ──────────────────────────────────────────────

    /// Publish `metadata`, then create the process on chain.
    ///
    /// The metadata origin is pinned to its content hash. Returns the id the
    /// chain assigned.
    pub async fn new_process(
        &self,
        mut params: NewProcessParams,
        metadata: &ProcessMetadata,
        signer: &KeyPair,
    ) -> Result<ProcessId, ClientError> {
        let bytes = metadata.to_json()?;
        let uri = self.storage.add(bytes.clone(), "metadata.json", signer).await?;
        params.metadata_uri = pinned_origin(&uri, &bytes);
        params.entity = derive_address(&signer.public);
        params.question_count = u8::try_from(metadata.questions.len())
            .map_err(|_| ClientError::Metadata("too many questions".into()))?;

        let process_id = self.chain.next_process_id(&params.entity).await?;
        self.transact(ChainCall::NewProcess(params), signer).await?;
        info!(process = %process_id, "process created");
        Ok(process_id)
    }

    pub async fn set_process_status(
        &self,
        process_id: ProcessId,
        status: ProcessStatus,
        signer: &KeyPair,
    ) -> Result<(), ClientError> {
        self.transact(ChainCall::SetProcessStatus { process_id, status }, signer)
            .await?;
        info!(process = %process_id, ?status, "process status updated");
        Ok(())
    }

    async fn transact(&self, call: ChainCall, signer: &KeyPair) -> Result<(), ClientError> {
        let tx = self.chain.send_transaction(call, signer).await?;
        let receipt = self.chain.wait_for_receipt(&tx).await?;
        if !receipt.success {
            return Err(ChainError::Reverted(tx).into());
        }
        debug!(%tx, block = receipt.block_number, "transaction mined");
        Ok(())
    }

    /// Current state of a process; `NotYetAvailable` while gateways do not
    /// know it.
    pub async fn get_process_state(
        &self,
        process_id: ProcessId,
    ) -> Result<Availability<ProcessState>, ClientError> {
        let request = GatewayRequest::new("getProcessInfo").with("processId", process_id.to_hex());
        match self.pool.send(&request, None, None).await {
            Ok(response) => {
                let info: Value = response.field("process")?;
                Ok(Availability::Ready(ProcessState::from_gateway(process_id, info)?))
            }
            Err(GatewayError::Remote { message, .. })
                if message.to_lowercase().contains("not found") =>
            {
                Ok(Availability::NotYetAvailable(message))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Metadata of a process, fetched from its content origin.
    pub async fn get_process_metadata(
        &self,
        process_id: ProcessId,
    ) -> Result<Availability<ProcessMetadata>, ClientError> {
        match self.get_process_state(process_id).await? {
            Availability::Ready(state) => Ok(Availability::Ready(self.fetch_metadata(&state).await?)),
            Availability::NotYetAvailable(reason) => Ok(Availability::NotYetAvailable(reason)),
        }
    }

    async fn fetch_metadata(&self, state: &ProcessState) -> Result<ProcessMetadata, ClientError> {
        let bytes = fetch_content(self.storage.as_ref(), &state.metadata_uri).await?;
        ProcessMetadata::from_json(&bytes)
    }

    pub async fn get_process_keys(&self, process_id: ProcessId) -> Result<ProcessKeys, ClientError> {
        let response = self
            .call(GatewayRequest::new("getProcessKeys").with("processId", process_id.to_hex()))
            .await?;
        Ok(ProcessKeys {
            encryption_pub_keys: response.field_opt("encryptionPubKeys")?.unwrap_or_default(),
            encryption_priv_keys: response.field_opt("encryptionPrivKeys")?.unwrap_or_default(),
        })
    }

    // ── Votes ──────────────────────────────────────────────────────────

    /// Sign `envelope` with the voter's key and submit it.
    pub async fn submit_envelope(
        &self,
        envelope: VoteEnvelope,
        signer: &KeyPair,
    ) -> Result<Nullifier, ClientError> {
        let nullifier = envelope.nullifier;
        let signed = SignedTx::sign(&Tx::Vote(envelope), signer)?;
        self.submit_signed(&signed).await?;
        Ok(nullifier)
    }

    /// Submit an already signed (or anonymous) transaction as one opaque
    /// base64 payload.
    pub async fn submit_signed(&self, signed: &SignedTx) -> Result<(), ClientError> {
        let payload = signed.to_base64()?;
        self.call(GatewayRequest::new("submitRawTx").with("payload", payload))
            .await?;
        debug!("vote submitted");
        Ok(())
    }

    pub async fn get_envelope_status(
        &self,
        process_id: ProcessId,
        nullifier: Nullifier,
    ) -> Result<EnvelopeStatus, ClientError> {
        let response = self
            .call(
                GatewayRequest::new("getEnvelopeStatus")
                    .with("processId", process_id.to_hex())
                    .with("nullifier", nullifier.to_hex()),
            )
            .await?;
        Ok(EnvelopeStatus {
            registered: response.field_opt("registered")?.unwrap_or(false),
            block_height: response.field_opt("height")?,
            timestamp_ms: response
                .field_opt::<u64>("blockTimestamp")?
                .map(Timestamp::from_secs),
        })
    }

    /// Number of envelopes cast in a process.
    pub async fn get_envelope_height(&self, process_id: ProcessId) -> Result<u64, ClientError> {
        let response = self
            .call(GatewayRequest::new("getEnvelopeHeight").with("processId", process_id.to_hex()))
            .await?;
        Ok(response.field("height")?)
    }

    // ── Blocks ─────────────────────────────────────────────────────────

    /// Height of the chain that anchors processes, as opposed to the
    /// gateways' voting chain reported by [`Self::get_block_height`].
    pub async fn get_chain_block_number(&self) -> Result<u64, ClientError> {
        Ok(self.chain.block_number().await?)
    }

    pub async fn get_block_height(&self) -> Result<u64, ClientError> {
        let response = self.call(GatewayRequest::new("getBlockHeight")).await?;
        Ok(response.field("height")?)
    }

    pub async fn get_block_status(&self) -> Result<BlockStatus, ClientError> {
        let response = self.call(GatewayRequest::new("getBlockStatus")).await?;
        let height: u64 = response.field("height")?;
        let timestamp_secs: u64 = response.field("blockTimestamp")?;
        let block_times: Vec<u64> = response.field("blockTime")?;
        let block_times: [u64; 5] = block_times.as_slice().try_into().map_err(|_| {
            ClientError::InvalidResponse(format!(
                "expected 5 block time averages, got {}",
                block_times.len()
            ))
        })?;
        Ok(BlockStatus::new(
            height,
            Timestamp::from_secs(timestamp_secs),
            block_times,
        ))
    }

    /// Block expected to be current at `target`.
    pub async fn estimate_block_at_time(&self, target: Timestamp) -> Result<u64, ClientError> {
        let status = self.get_block_status().await?;
        Ok(block_at_time(target, &status))
    }

    /// Time at which `block` is expected (or was) mined.
    pub async fn estimate_time_at_block(&self, block: u64) -> Result<Timestamp, ClientError> {
        let status = self.get_block_status().await?;
        Ok(time_at_block(block, &status))
    }

    // ── Results ────────────────────────────────────────────────────────

    pub async fn get_raw_results(&self, process_id: ProcessId) -> Result<RawResults, ClientError> {
        let response = self
            .call(GatewayRequest::new("getResults").with("processId", process_id.to_hex()))
            .await?;
        let rows: Vec<Vec<Value>> = response.field("results")?;
        let results = rows
            .iter()
            .map(|row| row.iter().map(parse_counter).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RawResults {
            results,
            state: response.field_opt("state")?,
            height: response.field_opt("height")?.unwrap_or(0),
        })
    }

    /// Results of a process labelled with its metadata.
    ///
    /// - Canceled processes have an empty digest.
    /// - Encrypted processes are `NotYetAvailable` until their end and until
    ///   a private key was revealed, polled a few times.
    /// - A failed fetch is [`ClientError::ResultsUnavailable`]; results that
    ///   do not fit the metadata are [`ClientError::ResultsMismatch`].
    pub async fn get_results_digest(
        &self,
        process_id: ProcessId,
    ) -> Result<Availability<DigestedResults>, ClientError> {
        let unavailable = |e: ClientError| ClientError::ResultsUnavailable {
            process_id,
            source: Box::new(e),
        };

        let state = match self.get_process_state(process_id).await.map_err(unavailable)? {
            Availability::Ready(state) => state,
            Availability::NotYetAvailable(reason) => {
                return Ok(Availability::NotYetAvailable(reason))
            }
        };
        if state.status == ProcessStatus::Canceled {
            return Ok(Availability::Ready(DigestedResults::default()));
        }

        if state.envelope_type.encrypted_votes {
            let height = self.get_block_height().await.map_err(unavailable)?;
            if !state.reveal_keys_expected(height) {
                return Ok(Availability::NotYetAvailable(format!(
                    "encryption keys are revealed at block {}, current block is {height}",
                    state.end_block()
                )));
            }
            if !self.wait_for_private_keys(process_id).await.map_err(unavailable)? {
                return Ok(Availability::NotYetAvailable(
                    "encryption keys have not been revealed".into(),
                ));
            }
        }

        let metadata = self.fetch_metadata(&state).await.map_err(unavailable)?;
        let raw = self.get_raw_results(process_id).await.map_err(unavailable)?;
        let total_votes = self
            .get_envelope_height(process_id)
            .await
            .map_err(unavailable)?;

        Ok(Availability::Ready(digest_results(
            &metadata,
            &raw.results,
            total_votes,
        )?))
    }

    /// Poll for revealed keys, waiting between attempts.
    async fn wait_for_private_keys(&self, process_id: ProcessId) -> Result<bool, ClientError> {
        for attempt in 1..=self.key_poll_attempts {
            let keys = self.get_process_keys(process_id).await?;
            if !keys.encryption_priv_keys.is_empty() {
                return Ok(true);
            }
            if attempt < self.key_poll_attempts {
                debug!(process = %process_id, attempt, "encryption keys not revealed yet");
                self.sleeper.sleep(self.key_poll_wait).await;
            }
        }
        Ok(false)
    }
}

fn blocks(count: u64) -> Duration {
    Duration::from_millis(count.saturating_mul(NOMINAL_BLOCK_TIME_MS))
}

/// Counters arrive as decimal strings (they may exceed 64 bits) or numbers.
fn parse_counter(value: &Value) -> Result<u128, ClientError> {
    match value {
        Value::String(s) => s.parse::<u128>().ok(),
        Value::Number(n) => n.as_u64().map(u128::from),
        _ => None,
    }
    .ok_or_else(|| ClientError::InvalidResponse(format!("bad result counter {value}")))
}
