//! Voter and organizer signing keys.

use ballotlink_types::{decode_hex, KeyPair, PrivateKey, PublicKey};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::CryptoError;

fn from_signing_key(signing_key: &SigningKey) -> KeyPair {
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// A fresh random key pair, e.g. for a one-off voter identity.
pub fn generate_keypair() -> KeyPair {
    from_signing_key(&SigningKey::generate(&mut OsRng))
}

/// Deterministic key pair for a 32-byte seed.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    from_signing_key(&SigningKey::from_bytes(seed))
}

/// Load a signer from a hex private key (`0x` prefix optional), as wallets
/// and configuration files hand them over.
pub fn signer_from_hex(private_hex: &str) -> Result<KeyPair, CryptoError> {
    let mut bytes = decode_hex(private_hex).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    let seed: Result<[u8; 32], _> = bytes.as_slice().try_into();
    let len = bytes.len();
    bytes.zeroize();
    let mut seed = seed.map_err(|_| {
        CryptoError::InvalidKey(format!("private key is {len} bytes, expected 32"))
    })?;
    let keypair = keypair_from_seed(&seed);
    seed.zeroize();
    Ok(keypair)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_keys_differ() {
        let a = generate_keypair();
        let b = generate_keypair();
        assert_ne!(a.public.0, b.public.0);
    }

    #[test]
    fn seeded_keys_are_stable() {
        assert_eq!(
            keypair_from_seed(&[42u8; 32]).public.0,
            keypair_from_seed(&[42u8; 32]).public.0
        );
        assert_ne!(
            keypair_from_seed(&[1u8; 32]).public.0,
            keypair_from_seed(&[2u8; 32]).public.0
        );
    }

    #[test]
    fn signer_from_hex_matches_seed() {
        let hex_key = format!("0x{}", "07".repeat(32));
        let signer = signer_from_hex(&hex_key).unwrap();
        assert_eq!(signer.public.0, keypair_from_seed(&[7u8; 32]).public.0);
        assert_eq!(
            signer_from_hex(&"07".repeat(32)).unwrap().private.0,
            [7u8; 32]
        );
    }

    #[test]
    fn signer_from_hex_rejects_bad_input() {
        assert!(matches!(signer_from_hex("0x1234"), Err(CryptoError::InvalidKey(_))));
        assert!(matches!(signer_from_hex("zz"), Err(CryptoError::InvalidKey(_))));
    }
}
