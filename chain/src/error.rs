use ballotlink_types::TxHash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain RPC error: {0}")]
    Rpc(String),

    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    #[error("timed out waiting for transaction {0}")]
    ReceiptTimeout(TxHash),

    #[error("{0}")]
    Other(String),
}
