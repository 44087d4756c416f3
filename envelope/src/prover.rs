//! Zero-knowledge proving for anonymous censuses.

use ballotlink_census::AnonymousProof;
use ballotlink_types::{Nullifier, ProcessId};

use crate::EnvelopeError;

/// What a prover hands back: the proof to publish and the nullifier derived
/// inside the circuit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZkOutput {
    pub proof: Vec<u8>,
    pub nullifier: Nullifier,
}

/// Produces a membership proof for an anonymous census without revealing
/// the voter's secret.
pub trait ZkProver: Send + Sync {
    /// `vote_hash` binds the proof to the exact vote package being cast.
    fn prove(
        &self,
        witness: &AnonymousProof,
        process_id: &ProcessId,
        vote_hash: &[u8; 32],
    ) -> Result<ZkOutput, EnvelopeError>;
}
