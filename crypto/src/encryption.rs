//! Onion layers for encrypted votes.
//!
//! Each layer uses a fresh ephemeral X25519 key for Diffie-Hellman with the
//! recipient's public key, then ChaCha20-Poly1305 AEAD. The nonce is the
//! first 12 bytes of the ephemeral public key, which is unique per layer and
//! travels with the ciphertext.
//!
//! Layer format: `ephemeral_public (32) || ciphertext || tag (16)`.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::hash::blake2b_256_multi;

const KDF_DOMAIN: &[u8] = b"ballotlink-vote";

/// Bytes one layer adds on top of its plaintext.
pub const ONION_LAYER_OVERHEAD: usize = 32 + 16;

/// An X25519 key pair used by a process to receive encrypted votes.
///
/// Key-keepers publish `public` while the process is open and reveal
/// `secret` once it ends.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKeyPair {
    pub secret: [u8; 32],
    pub public: [u8; 32],
}

impl EncryptionKeyPair {
    pub fn generate() -> Self {
        let mut secret = [0u8; 32];
        OsRng.fill_bytes(&mut secret);
        Self::from_secret(secret)
    }

    pub fn from_secret(secret: [u8; 32]) -> Self {
        let public = X25519Public::from(&StaticSecret::from(secret));
        Self {
            secret,
            public: *public.as_bytes(),
        }
    }
}

fn layer_cipher(shared: &[u8; 32], ephemeral_public: &[u8; 32]) -> ChaCha20Poly1305 {
    let key = blake2b_256_multi(&[shared, ephemeral_public, KDF_DOMAIN]);
    ChaCha20Poly1305::new(Key::from_slice(&key))
}

/// Wrap `plaintext` in one layer readable only by the holder of the secret
/// matching `recipient_public`.
pub fn seal_layer(recipient_public: &[u8; 32], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut ephemeral_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut ephemeral_bytes);
    let ephemeral = StaticSecret::from(ephemeral_bytes);
    ephemeral_bytes.zeroize();
    let ephemeral_public = X25519Public::from(&ephemeral);

    let shared = ephemeral.diffie_hellman(&X25519Public::from(*recipient_public));
    let cipher = layer_cipher(shared.as_bytes(), ephemeral_public.as_bytes());
    let nonce = Nonce::from_slice(&ephemeral_public.as_bytes()[..12]);

    let sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(32 + sealed.len());
    out.extend_from_slice(ephemeral_public.as_bytes());
    out.extend(sealed);
    Ok(out)
}

/// Remove one layer using the recipient's secret key.
pub fn open_layer(recipient_secret: &[u8; 32], layer: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if layer.len() < ONION_LAYER_OVERHEAD {
        return Err(CryptoError::CiphertextTooShort {
            len: layer.len(),
            min: ONION_LAYER_OVERHEAD,
        });
    }
    let mut ephemeral_public = [0u8; 32];
    ephemeral_public.copy_from_slice(&layer[..32]);

    let secret = StaticSecret::from(*recipient_secret);
    let shared = secret.diffie_hellman(&X25519Public::from(ephemeral_public));
    let cipher = layer_cipher(shared.as_bytes(), &ephemeral_public);
    let nonce = Nonce::from_slice(&ephemeral_public[..12]);

    cipher
        .decrypt(nonce, &layer[32..])
        .map_err(|_| CryptoError::DecryptionFailed)
}
