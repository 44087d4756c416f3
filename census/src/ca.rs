//! Certification-authority censuses.
//!
//! The authority signs a per-voter bundle; the voter presents the signature
//! as its proof. Blind variants let the authority sign without learning the
//! bundle.

use ballotlink_crypto::blake2b_256_multi;
use ballotlink_types::{Address, ProcessId};

use crate::proof::{CaProof, CaSignatureType};
use crate::CensusError;

/// Message the authority signs for `voter` in `process_id`.
///
/// For pid-salted signature types the address is XORed with the leading
/// bytes of the process id first, so a bundle cannot be replayed across
/// processes.
pub fn ca_bundle(
    process_id: &ProcessId,
    voter: &Address,
    signature_type: CaSignatureType,
) -> [u8; 32] {
    let mut address = *voter.as_bytes();
    if signature_type.is_pid_salted() {
        for (byte, salt) in address.iter_mut().zip(process_id.as_bytes()) {
            *byte ^= salt;
        }
    }
    blake2b_256_multi(&[process_id.as_bytes(), &address])
}

/// Signature scheme of a certification authority.
///
/// `blind`/`unblind` are only used for the blind signature types; `verify`
/// checks plain and unblinded signatures alike.
pub trait BlindSignatureScheme: Send + Sync {
    /// Blind `message` against the authority's per-request point `signer_point`.
    /// Returns the blinded message and the secret needed to unblind.
    fn blind(&self, message: &[u8], signer_point: &[u8])
        -> Result<(Vec<u8>, Vec<u8>), CensusError>;

    fn unblind(&self, blinded_signature: &[u8], secret: &[u8]) -> Result<Vec<u8>, CensusError>;

    fn verify(&self, message: &[u8], signature: &[u8], authority_key: &[u8]) -> bool;
}

/// Check that `proof` carries a valid authority signature over the voter's
/// bundle for `process_id`.
pub fn verify_ca_proof(
    scheme: &dyn BlindSignatureScheme,
    ca_public_key: &[u8],
    process_id: &ProcessId,
    proof: &CaProof,
) -> Result<(), CensusError> {
    let bundle = ca_bundle(process_id, &proof.voter_address, proof.signature_type);
    if scheme.verify(&bundle, &proof.signature, ca_public_key) {
        Ok(())
    } else {
        Err(CensusError::SignatureRejected)
    }
}
