use thiserror::Error;

/// A census proof payload did not have the shape its origin requires.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid census proof field `{field}`: {reason}")]
pub struct ValidationError {
    /// Path of the offending field, e.g. `proof[2]` or `voterAddress`.
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CensusError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("certification authority signature rejected")]
    SignatureRejected,

    #[error("signature scheme error: {0}")]
    Scheme(String),
}
