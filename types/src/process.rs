//! Process identifiers and the enums gateways report about a process.

use serde::{Deserialize, Serialize};

use crate::TypesError;

fixed_bytes!(
    /// A 32-byte voting process identifier.
    ProcessId,
    32
);

/// How the census of a process is defined, and therefore which proof a
/// voter must present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CensusOrigin {
    /// Off-chain Merkle tree, one vote per leaf.
    OffChainTree,
    /// Off-chain Merkle tree whose leaves carry a weight.
    OffChainTreeWeighted,
    /// Certification authority signing per-voter bundles.
    OffChainCa,
    Erc20,
    Erc721,
    Erc1155,
    Erc777,
    /// Off-chain tree of voter keys, membership proven in zero knowledge.
    OffChainAnonymous,
}

impl CensusOrigin {
    /// Numeric code used on the gateway wire.
    pub fn code(&self) -> u8 {
        match self {
            Self::OffChainTree => 1,
            Self::OffChainTreeWeighted => 2,
            Self::OffChainCa => 3,
            Self::Erc20 => 11,
            Self::Erc721 => 12,
            Self::Erc1155 => 13,
            Self::Erc777 => 14,
            Self::OffChainAnonymous => 21,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, TypesError> {
        Ok(match code {
            1 => Self::OffChainTree,
            2 => Self::OffChainTreeWeighted,
            3 => Self::OffChainCa,
            11 => Self::Erc20,
            12 => Self::Erc721,
            13 => Self::Erc1155,
            14 => Self::Erc777,
            21 => Self::OffChainAnonymous,
            other => {
                return Err(TypesError::UnknownVariant {
                    kind: "census origin",
                    value: other,
                })
            }
        })
    }

    /// Token-balance censuses proven with an EVM storage proof.
    pub fn is_evm(&self) -> bool {
        matches!(self, Self::Erc20 | Self::Erc721 | Self::Erc1155 | Self::Erc777)
    }
}

/// Lifecycle status of a process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStatus {
    Ready,
    Ended,
    Canceled,
    Paused,
    /// Results have been published on chain.
    Results,
}

impl ProcessStatus {
    pub fn code(&self) -> u8 {
        match self {
            Self::Ready => 0,
            Self::Ended => 1,
            Self::Canceled => 2,
            Self::Paused => 3,
            Self::Results => 4,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, TypesError> {
        Ok(match code {
            0 => Self::Ready,
            1 => Self::Ended,
            2 => Self::Canceled,
            3 => Self::Paused,
            4 => Self::Results,
            other => {
                return Err(TypesError::UnknownVariant {
                    kind: "process status",
                    value: other,
                })
            }
        })
    }
}

/// Envelope flags of a process, packed as a bit field on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnvelopeType {
    pub serial: bool,
    pub anonymous: bool,
    pub encrypted_votes: bool,
    pub unique_values: bool,
    pub cost_from_weight: bool,
}

impl EnvelopeType {
    const SERIAL: u8 = 1 << 0;
    const ANONYMOUS: u8 = 1 << 1;
    const ENCRYPTED_VOTES: u8 = 1 << 2;
    const UNIQUE_VALUES: u8 = 1 << 3;
    const COST_FROM_WEIGHT: u8 = 1 << 4;

    pub fn from_bits(bits: u8) -> Self {
        Self {
            serial: bits & Self::SERIAL != 0,
            anonymous: bits & Self::ANONYMOUS != 0,
            encrypted_votes: bits & Self::ENCRYPTED_VOTES != 0,
            unique_values: bits & Self::UNIQUE_VALUES != 0,
            cost_from_weight: bits & Self::COST_FROM_WEIGHT != 0,
        }
    }

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.serial {
            bits |= Self::SERIAL;
        }
        if self.anonymous {
            bits |= Self::ANONYMOUS;
        }
        if self.encrypted_votes {
            bits |= Self::ENCRYPTED_VOTES;
        }
        if self.unique_values {
            bits |= Self::UNIQUE_VALUES;
        }
        if self.cost_from_weight {
            bits |= Self::COST_FROM_WEIGHT;
        }
        bits
    }
}

/// Process mode flags, packed as a bit field on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessMode {
    pub auto_start: bool,
    pub interruptible: bool,
    pub dynamic_census: bool,
    pub encrypted_metadata: bool,
}

impl ProcessMode {
    const AUTO_START: u8 = 1 << 0;
    const INTERRUPTIBLE: u8 = 1 << 1;
    const DYNAMIC_CENSUS: u8 = 1 << 2;
    const ENCRYPTED_METADATA: u8 = 1 << 3;

    pub fn from_bits(bits: u8) -> Self {
        Self {
            auto_start: bits & Self::AUTO_START != 0,
            interruptible: bits & Self::INTERRUPTIBLE != 0,
            dynamic_census: bits & Self::DYNAMIC_CENSUS != 0,
            encrypted_metadata: bits & Self::ENCRYPTED_METADATA != 0,
        }
    }

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.auto_start {
            bits |= Self::AUTO_START;
        }
        if self.interruptible {
            bits |= Self::INTERRUPTIBLE;
        }
        if self.dynamic_census {
            bits |= Self::DYNAMIC_CENSUS;
        }
        if self.encrypted_metadata {
            bits |= Self::ENCRYPTED_METADATA;
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn census_origin_codes_round_trip() {
        for origin in [
            CensusOrigin::OffChainTree,
            CensusOrigin::OffChainTreeWeighted,
            CensusOrigin::OffChainCa,
            CensusOrigin::Erc20,
            CensusOrigin::Erc721,
            CensusOrigin::Erc1155,
            CensusOrigin::Erc777,
            CensusOrigin::OffChainAnonymous,
        ] {
            assert_eq!(CensusOrigin::from_code(origin.code() as u64).unwrap(), origin);
        }
        assert!(CensusOrigin::from_code(99).is_err());
    }

    #[test]
    fn evm_origins() {
        assert!(CensusOrigin::Erc20.is_evm());
        assert!(CensusOrigin::Erc777.is_evm());
        assert!(!CensusOrigin::OffChainCa.is_evm());
    }

    #[test]
    fn envelope_type_bits() {
        let t = EnvelopeType::from_bits(0b0_0101);
        assert!(t.serial);
        assert!(!t.anonymous);
        assert!(t.encrypted_votes);
        assert_eq!(t.bits(), 0b0_0101);
    }

    #[test]
    fn process_mode_bits() {
        let m = ProcessMode::from_bits(0b0011);
        assert!(m.auto_start && m.interruptible);
        assert!(!m.dynamic_census);
        assert_eq!(m.bits(), 0b0011);
    }

    #[test]
    fn status_codes() {
        assert_eq!(ProcessStatus::from_code(2).unwrap(), ProcessStatus::Canceled);
        assert!(ProcessStatus::from_code(7).is_err());
    }
}
