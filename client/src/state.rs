//! Process and envelope state as reported by gateways.

use ballotlink_types::{
    Address, CensusOrigin, EnvelopeType, ProcessId, ProcessMode, ProcessStatus, Timestamp,
};
use serde::Deserialize;

use crate::ClientError;

/// On-chain parameters and lifecycle of a process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessState {
    pub id: ProcessId,
    pub entity: Address,
    pub status: ProcessStatus,
    pub envelope_type: EnvelopeType,
    pub mode: ProcessMode,
    pub census_origin: CensusOrigin,
    pub census_root: String,
    pub census_uri: String,
    /// Content origin of the metadata, see [`crate::storage`].
    pub metadata_uri: String,
    pub start_block: u64,
    pub block_count: u64,
    pub question_index: u8,
    pub question_count: u8,
    pub max_count: u8,
    pub max_value: u8,
    pub max_vote_overwrites: u8,
    pub max_total_cost: u16,
    pub cost_exponent: u16,
    pub creation_time: Timestamp,
    pub have_results: bool,
    pub final_results: bool,
}

impl ProcessState {
    pub fn end_block(&self) -> u64 {
        self.start_block.saturating_add(self.block_count)
    }

    /// Whether the private encryption keys should have been revealed by
    /// `current_block`.
    ///
    /// Interruptible processes can end early, so their status counts too.
    pub fn reveal_keys_expected(&self, current_block: u64) -> bool {
        let ended = current_block >= self.end_block();
        if self.mode.interruptible {
            ended || matches!(self.status, ProcessStatus::Ended | ProcessStatus::Results)
        } else {
            ended
        }
    }

    /// Parse the `process` object of a `getProcessInfo` answer.
    pub fn from_gateway(id: ProcessId, value: serde_json::Value) -> Result<Self, ClientError> {
        let info: ProcessInfo = serde_json::from_value(value)
            .map_err(|e| ClientError::InvalidResponse(format!("process info: {e}")))?;
        Ok(Self {
            id,
            entity: Address::from_hex(&info.entity_id)?,
            status: ProcessStatus::from_code(info.status)?,
            envelope_type: EnvelopeType::from_bits(info.envelope_type),
            mode: ProcessMode::from_bits(info.mode),
            census_origin: CensusOrigin::from_code(info.census_origin)?,
            census_root: info.census_root,
            census_uri: info.census_uri,
            metadata_uri: info.metadata,
            start_block: info.start_block,
            block_count: info.block_count,
            question_index: info.question_index,
            question_count: info.question_count,
            max_count: info.max_count,
            max_value: info.max_value,
            max_vote_overwrites: info.max_vote_overwrites,
            max_total_cost: info.max_total_cost,
            cost_exponent: info.cost_exponent,
            creation_time: Timestamp::from_secs(info.creation_time),
            have_results: info.have_results,
            final_results: info.final_results,
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessInfo {
    entity_id: String,
    status: u64,
    envelope_type: u8,
    mode: u8,
    census_origin: u64,
    #[serde(default)]
    census_root: String,
    #[serde(default, rename = "censusURI")]
    census_uri: String,
    metadata: String,
    start_block: u64,
    block_count: u64,
    #[serde(default)]
    question_index: u8,
    question_count: u8,
    max_count: u8,
    max_value: u8,
    #[serde(default)]
    max_vote_overwrites: u8,
    #[serde(default)]
    max_total_cost: u16,
    #[serde(default)]
    cost_exponent: u16,
    /// Seconds since the epoch.
    #[serde(default)]
    creation_time: u64,
    #[serde(default)]
    have_results: bool,
    #[serde(default)]
    final_results: bool,
}

/// Whether a vote was registered, and when.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvelopeStatus {
    pub registered: bool,
    pub block_height: Option<u64>,
    /// Timestamp of that block, millisecond precision.
    pub timestamp_ms: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_info() -> serde_json::Value {
        json!({
            "entityId": "0x00112233445566778899aabbccddeeff00112233",
            "status": 0,
            "envelopeType": 4,
            "mode": 2,
            "censusOrigin": 1,
            "censusRoot": "0xabcd",
            "censusURI": "ipfs://census",
            "metadata": "ipfs://meta",
            "startBlock": 100,
            "blockCount": 50,
            "questionCount": 1,
            "maxCount": 1,
            "maxValue": 2,
            "creationTime": 1_700_000_000u64,
        })
    }

    #[test]
    fn parses_gateway_info() {
        let state = ProcessState::from_gateway(ProcessId::ZERO, sample_info()).unwrap();
        assert_eq!(state.status, ProcessStatus::Ready);
        assert!(state.envelope_type.encrypted_votes);
        assert!(state.mode.interruptible);
        assert_eq!(state.census_origin, CensusOrigin::OffChainTree);
        assert_eq!(state.end_block(), 150);
        assert_eq!(state.creation_time.as_millis(), 1_700_000_000_000);
    }

    #[test]
    fn unknown_codes_fail() {
        let mut info = sample_info();
        info["censusOrigin"] = json!(99);
        assert!(ProcessState::from_gateway(ProcessId::ZERO, info).is_err());
    }

    #[test]
    fn interruptible_reveal_follows_status() {
        let mut state = ProcessState::from_gateway(ProcessId::ZERO, sample_info()).unwrap();
        assert!(!state.reveal_keys_expected(120));
        assert!(state.reveal_keys_expected(150));
        state.status = ProcessStatus::Ended;
        assert!(state.reveal_keys_expected(120));
    }

    #[test]
    fn fixed_length_reveal_only_at_end_block() {
        let mut state = ProcessState::from_gateway(ProcessId::ZERO, sample_info()).unwrap();
        state.mode.interruptible = false;
        state.status = ProcessStatus::Ended;
        assert!(!state.reveal_keys_expected(149));
        assert!(state.reveal_keys_expected(150));
    }
}
