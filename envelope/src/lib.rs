//! Everything between a voter's choices and the opaque payload a gateway
//! relays to the chain.
//!
//! 1. [`VotePackage`]: `{nonce, votes}` JSON, optionally onion-encrypted
//!    with the process keys.
//! 2. [`VoteEnvelope`]: the package plus the census proof and nullifier.
//! 3. [`SignedTx`]: the bincode-encoded [`Tx`] with the voter's signature,
//!    base64-encoded for submission.

pub mod envelope;
pub mod error;
pub mod nullifier;
pub mod package;
pub mod prover;
pub mod tx;

pub use envelope::{
    package_anonymous, package_signed, package_vote, EnvelopeProof, VoteEnvelope, ZkProof,
};
pub use error::EnvelopeError;
pub use nullifier::{nullifier, nullifier_from_hex};
pub use package::{encode_vote_package, open_vote_package, ProcessKey, VotePackage};
pub use prover::{ZkOutput, ZkProver};
pub use tx::{SignedTx, Tx, TxSignature};
