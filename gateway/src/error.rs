use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never got an HTTP answer.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("request to {uri} timed out after {ms} ms")]
    Timeout { uri: String, ms: u64 },

    /// The gateway answered with `ok: false`.
    #[error("{method} failed: {message}")]
    Remote { method: String, message: String },

    #[error("invalid response signature from {0}")]
    InvalidSignature(String),

    /// A sequential-state method failed; retrying elsewhere would corrupt
    /// the sequence.
    #[error("{method} failed mid-sequence, restart the whole operation from scratch: {source}")]
    SequentialState {
        method: String,
        #[source]
        source: Box<GatewayError>,
    },

    #[error("gateway pool exhausted after {attempts} consecutive failures")]
    PoolExhausted { attempts: u32 },

    #[error("gateway discovery failed: {0}")]
    Discovery(String),

    #[error("malformed gateway message: {0}")]
    Codec(String),
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Codec(e.to_string())
    }
}
