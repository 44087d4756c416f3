//! Census membership proofs.
//!
//! A process declares a [`CensusOrigin`](ballotlink_types::CensusOrigin);
//! [`resolve`] turns the payload a census service handed to the voter into
//! the matching [`CensusProof`] variant. The variant is chosen from the
//! origin alone, never guessed from the payload's shape.

pub mod ca;
pub mod error;
pub mod proof;
pub mod resolver;

pub use ca::{ca_bundle, verify_ca_proof, BlindSignatureScheme};
pub use error::{CensusError, ValidationError};
pub use proof::{
    AnonymousProof, CaProof, CaSignatureType, CensusProof, EvmStorageProof, FieldElement,
    TreeKind, TreeProof,
};
pub use resolver::resolve;
