//! Fundamental types for the ballotlink voting client.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! voter addresses, process identifiers, hashes, keys, timestamps and the
//! process/census enums reported by gateways.

#[macro_use]
mod bytes;

pub mod address;
pub mod availability;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod process;
pub mod time;

pub use address::Address;
pub use availability::Availability;
pub use bytes::decode_hex;
pub use error::TypesError;
pub use hash::{Nullifier, TxHash};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::Environment;
pub use process::{CensusOrigin, EnvelopeType, ProcessId, ProcessMode, ProcessStatus};
pub use time::Timestamp;
