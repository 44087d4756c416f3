//! The vote package: the voter's choices plus a nonce, as JSON, optionally
//! wrapped in one encryption layer per process key.

use ballotlink_crypto::{open_layer, seal_layer};
use ballotlink_types::decode_hex;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::EnvelopeError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePackage {
    /// 8 random bytes as 16 lowercase hex characters, fresh per package.
    pub nonce: String,
    pub votes: Vec<u32>,
}

impl VotePackage {
    pub fn new(votes: Vec<u32>) -> Self {
        let nonce: [u8; 8] = rand::thread_rng().gen();
        Self {
            nonce: hex::encode(nonce),
            votes,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, EnvelopeError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// A process encryption key as gateways list it.
///
/// Public keys are published while the process runs; the matching private
/// keys are revealed once it ends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessKey {
    #[serde(rename = "idx")]
    pub index: u32,
    pub key: String,
}

impl ProcessKey {
    pub fn new(index: u32, key: &[u8; 32]) -> Self {
        Self {
            index,
            key: hex::encode(key),
        }
    }

    pub fn key_bytes(&self) -> Result<[u8; 32], EnvelopeError> {
        let bytes = decode_hex(&self.key).map_err(|e| EnvelopeError::InvalidProcessKey {
            index: self.index,
            reason: e.to_string(),
        })?;
        <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| EnvelopeError::InvalidProcessKey {
            index: self.index,
            reason: format!("expected 32 bytes, got {}", bytes.len()),
        })
    }
}

/// Serialize `package` and seal it with every key in ascending index order,
/// each layer wrapping the previous ciphertext.
///
/// Returns the payload and the indexes used, in sealing order. With no keys
/// the payload is the plain JSON and the index list is empty.
pub fn encode_vote_package(
    package: &VotePackage,
    public_keys: &[ProcessKey],
) -> Result<(Vec<u8>, Vec<u32>), EnvelopeError> {
    let mut keys: Vec<&ProcessKey> = public_keys.iter().collect();
    keys.sort_by_key(|k| k.index);

    let mut payload = package.to_json()?;
    let mut indexes = Vec::with_capacity(keys.len());
    for key in keys {
        payload = seal_layer(&key.key_bytes()?, &payload)?;
        indexes.push(key.index);
    }
    Ok((payload, indexes))
}

/// Peel the layers of an encrypted package, last index first.
///
/// `indexes` is the list carried by the envelope; `private_keys` are the
/// revealed keys of the process.
pub fn open_vote_package(
    package: &[u8],
    private_keys: &[ProcessKey],
    indexes: &[u32],
) -> Result<VotePackage, EnvelopeError> {
    let mut payload = package.to_vec();
    for index in indexes.iter().rev() {
        let key = private_keys
            .iter()
            .find(|k| k.index == *index)
            .ok_or(EnvelopeError::MissingKey(*index))?;
        payload = open_layer(&key.key_bytes()?, &payload)?;
    }
    VotePackage::from_json(&payload)
}
