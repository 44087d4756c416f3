//! Nullifiers of non-anonymous votes.

use ballotlink_crypto::blake2b_256_multi;
use ballotlink_types::{Address, Nullifier, ProcessId};

/// `blake2b-256(address || process_id)`.
pub fn nullifier(address: &Address, process_id: &ProcessId) -> Nullifier {
    Nullifier::new(blake2b_256_multi(&[address.as_bytes(), process_id.as_bytes()]))
}

/// Same as [`nullifier`], from hex text. `None` unless the inputs decode to
/// exactly 20 and 32 bytes.
pub fn nullifier_from_hex(address: &str, process_id: &str) -> Option<Nullifier> {
    let address = Address::from_hex(address).ok()?;
    let process_id = ProcessId::from_hex(process_id).ok()?;
    Some(nullifier(&address, &process_id))
}
