use ballotlink_crypto::CryptoError;
use ballotlink_types::CensusOrigin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The census proof does not belong to the process's census origin.
    #[error("census origin {origin:?} cannot carry a {proof} proof")]
    ProtocolMismatch {
        origin: CensusOrigin,
        proof: &'static str,
    },

    #[error("invalid process key {index}: {reason}")]
    InvalidProcessKey { index: u32, reason: String },

    #[error("no private key for index {0}")]
    MissingKey(u32),

    #[error("vote package encryption failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("malformed vote package: {0}")]
    Package(#[from] serde_json::Error),

    #[error("transaction encoding failed: {0}")]
    Encoding(String),

    #[error("transaction decoding failed: {0}")]
    Decoding(String),

    #[error("transaction is not signed")]
    Unsigned,

    #[error("invalid transaction signature")]
    InvalidSignature,

    #[error("nullifier does not match the signer")]
    NullifierMismatch,

    #[error("zk prover failed: {0}")]
    Prover(String),
}
