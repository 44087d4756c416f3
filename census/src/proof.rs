//! The proof variants a voter can present, one per census family.

use ballotlink_types::{Address, CensusOrigin};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Whether the Merkle tree leaves carry a voting weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeKind {
    Plain,
    Weighted,
}

/// Merkle sibling path for an off-chain tree census.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeProof {
    pub kind: TreeKind,
    /// Packed sibling blob as produced by the census service.
    pub siblings: Vec<u8>,
}

/// Signature flavour a certification authority used for the voter bundle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaSignatureType {
    #[serde(rename = "ecdsa")]
    Ecdsa,
    #[serde(rename = "ecdsa_pidsalted")]
    EcdsaPidSalted,
    #[serde(rename = "ecdsa_blind")]
    EcdsaBlind,
    #[serde(rename = "ecdsa_blind_pidsalted")]
    EcdsaBlindPidSalted,
}

impl CaSignatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ecdsa => "ecdsa",
            Self::EcdsaPidSalted => "ecdsa_pidsalted",
            Self::EcdsaBlind => "ecdsa_blind",
            Self::EcdsaBlindPidSalted => "ecdsa_blind_pidsalted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "ecdsa" => Self::Ecdsa,
            "ecdsa_pidsalted" => Self::EcdsaPidSalted,
            "ecdsa_blind" => Self::EcdsaBlind,
            "ecdsa_blind_pidsalted" => Self::EcdsaBlindPidSalted,
            _ => return None,
        })
    }

    /// The voter address is salted with the process id before signing.
    pub fn is_pid_salted(&self) -> bool {
        matches!(self, Self::EcdsaPidSalted | Self::EcdsaBlindPidSalted)
    }

    pub fn is_blind(&self) -> bool {
        matches!(self, Self::EcdsaBlind | Self::EcdsaBlindPidSalted)
    }
}

/// A certification authority's signature over the voter's bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaProof {
    pub signature_type: CaSignatureType,
    pub voter_address: Address,
    pub signature: Vec<u8>,
}

/// Storage proof of a token balance slot on an EVM chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmStorageProof {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    /// RLP-encoded trie nodes from the storage root down to the slot.
    pub siblings: Vec<Vec<u8>>,
}

/// A 32-byte big-endian field element.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct FieldElement(pub [u8; 32]);

impl FieldElement {
    /// Left-pads `bytes` to 32 bytes. `None` when longer than 32.
    pub fn from_be_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > 32 {
            return None;
        }
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(bytes);
        Some(Self(out))
    }
}

impl std::fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldElement({})", hex::encode(&self.0[..4]))
    }
}

/// Witness for an anonymous (zk) census.
///
/// Holds the voter's secret; it is handed to a prover and never put on the
/// wire.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymousProof {
    pub secret_key: FieldElement,
    pub rolling_root: FieldElement,
    pub siblings: Vec<FieldElement>,
    pub key_index: u64,
}

impl std::fmt::Debug for AnonymousProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnonymousProof")
            .field("secret_key", &"<redacted>")
            .field("rolling_root", &self.rolling_root)
            .field("siblings", &self.siblings.len())
            .field("key_index", &self.key_index)
            .finish()
    }
}

impl Drop for AnonymousProof {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

/// Proof of census membership, tagged by census family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CensusProof {
    Tree(TreeProof),
    Ca(CaProof),
    EvmStorage(EvmStorageProof),
    Anonymous(AnonymousProof),
}

impl CensusProof {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Tree(_) => "tree",
            Self::Ca(_) => "ca",
            Self::EvmStorage(_) => "evm_storage",
            Self::Anonymous(_) => "anonymous",
        }
    }

    /// Whether this proof is the one `origin` asks voters for.
    pub fn matches_origin(&self, origin: CensusOrigin) -> bool {
        match self {
            Self::Tree(tree) => match tree.kind {
                TreeKind::Plain => origin == CensusOrigin::OffChainTree,
                TreeKind::Weighted => origin == CensusOrigin::OffChainTreeWeighted,
            },
            Self::Ca(_) => origin == CensusOrigin::OffChainCa,
            Self::EvmStorage(_) => origin.is_evm(),
            Self::Anonymous(_) => origin == CensusOrigin::OffChainAnonymous,
        }
    }
}
