//! Cryptographic primitives for the ballotlink client.
//!
//! - **Ed25519** for voter, gateway and request signatures
//! - **Blake2b** for nullifiers, content hashes and address derivation
//! - **X25519 + ChaCha20-Poly1305** for the onion layers wrapping encrypted votes
//! - Canonical JSON encoding so signatures over gateway messages are reproducible

pub mod address;
pub mod encryption;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::derive_address;
pub use encryption::{open_layer, seal_layer, EncryptionKeyPair, ONION_LAYER_OVERHEAD};
pub use error::CryptoError;
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{generate_keypair, keypair_from_seed, signer_from_hex};
pub use sign::{canonical_json, sign_json, sign_message, verify_json, verify_signature};
