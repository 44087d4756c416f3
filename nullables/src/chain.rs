//! Nullable chain: records transactions, mines them instantly.

use std::sync::Mutex;

use async_trait::async_trait;
use ballotlink_chain::{ChainCall, ChainError, ChainProvider, TxReceipt};
use ballotlink_types::{Address, KeyPair, ProcessId, TxHash};

use crate::lock;

pub struct NullChain {
    block: Mutex<u64>,
    next_process_id: Mutex<Option<ProcessId>>,
    sent: Mutex<Vec<ChainCall>>,
    revert: Mutex<bool>,
}

impl NullChain {
    pub fn new(block: u64) -> Self {
        Self {
            block: Mutex::new(block),
            next_process_id: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            revert: Mutex::new(false),
        }
    }

    pub fn set_next_process_id(&self, id: ProcessId) {
        *lock(&self.next_process_id) = Some(id);
    }

    /// Make every following receipt report a failed transaction.
    pub fn revert_transactions(&self) {
        *lock(&self.revert) = true;
    }

    pub fn advance(&self, blocks: u64) {
        *lock(&self.block) += blocks;
    }

    /// Calls sent so far, in order.
    pub fn sent(&self) -> Vec<ChainCall> {
        lock(&self.sent).clone()
    }
}

impl Default for NullChain {
    fn default() -> Self {
        Self::new(0)
    }
}

#[async_trait]
impl ChainProvider for NullChain {
    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(*lock(&self.block))
    }

    async fn next_process_id(&self, _entity: &Address) -> Result<ProcessId, ChainError> {
        lock(&self.next_process_id)
            .ok_or_else(|| ChainError::Other("no process id scripted".into()))
    }

    async fn send_transaction(
        &self,
        call: ChainCall,
        _signer: &KeyPair,
    ) -> Result<TxHash, ChainError> {
        let mut sent = lock(&self.sent);
        sent.push(call);
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&(sent.len() as u64).to_be_bytes());
        Ok(TxHash::new(hash))
    }

    async fn wait_for_receipt(&self, tx: &TxHash) -> Result<TxReceipt, ChainError> {
        Ok(TxReceipt {
            tx_hash: *tx,
            block_number: *lock(&self.block),
            success: !*lock(&self.revert),
        })
    }
}
