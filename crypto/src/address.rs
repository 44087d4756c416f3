//! Address derivation from public keys.
//!
//! An address is the last 20 bytes of `Blake2b-256(public_key)`, the same
//! truncation scheme account-based chains use for their keccak addresses.

use ballotlink_types::{Address, PublicKey};

use crate::hash::blake2b_256;

/// Derive the 20-byte address that identifies the holder of `public_key`.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let digest = blake2b_256(public_key.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::new(bytes)
}
