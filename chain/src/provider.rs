//! The chain RPC capability.
//!
//! The client never encodes contract calls itself: it describes the call and
//! a [`ChainProvider`] implementation turns it into a signed transaction.

use async_trait::async_trait;
use ballotlink_types::{
    Address, CensusOrigin, EnvelopeType, KeyPair, ProcessId, ProcessMode, ProcessStatus, TxHash,
};
use serde::{Deserialize, Serialize};

use crate::ChainError;

/// On-chain parameters of a new process, minus the metadata pointer which
/// the client fills in after uploading the metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProcessParams {
    pub entity: Address,
    pub mode: ProcessMode,
    pub envelope_type: EnvelopeType,
    pub census_origin: CensusOrigin,
    pub census_root: String,
    pub census_uri: String,
    pub metadata_uri: String,
    pub start_block: u64,
    pub block_count: u64,
    pub question_count: u8,
    pub max_count: u8,
    pub max_value: u8,
    pub max_vote_overwrites: u8,
    pub max_total_cost: u16,
    pub cost_exponent: u16,
}

/// A state-changing call against the process contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainCall {
    NewProcess(NewProcessParams),
    SetProcessStatus {
        process_id: ProcessId,
        status: ProcessStatus,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    pub success: bool,
}

/// JSON-RPC style access to the chain that anchors processes.
#[async_trait]
pub trait ChainProvider: Send + Sync {
    /// Current height of the anchoring chain.
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Identifier the next process created by `entity` will receive.
    async fn next_process_id(&self, entity: &Address) -> Result<ProcessId, ChainError>;

    /// Sign and broadcast `call`, returning without waiting for inclusion.
    async fn send_transaction(&self, call: ChainCall, signer: &KeyPair)
        -> Result<TxHash, ChainError>;

    /// Block until `tx` is mined.
    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<TxReceipt, ChainError>;
}
