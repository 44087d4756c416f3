use ballotlink_chain::ChainError;
use ballotlink_envelope::EnvelopeError;
use ballotlink_gateway::GatewayError;
use ballotlink_types::{ProcessId, TypesError};
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("invalid value: {0}")]
    Types(#[from] TypesError),

    #[error("unexpected gateway answer: {0}")]
    InvalidResponse(String),

    #[error("invalid process metadata: {0}")]
    Metadata(String),

    /// Something needed for the results of `process_id` could not be fetched.
    #[error("results of {process_id} are not available")]
    ResultsUnavailable {
        process_id: ProcessId,
        #[source]
        source: Box<ClientError>,
    },

    /// Raw results and metadata disagree on the ballot's shape.
    #[error("results do not match the process metadata: {0}")]
    ResultsMismatch(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("logging setup failed: {0}")]
    Logging(String),
}
