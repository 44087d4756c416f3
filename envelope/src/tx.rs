//! Transactions as submitted through a gateway.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ballotlink_crypto::{derive_address, sign_message, verify_signature};
use ballotlink_types::{Address, KeyPair, PublicKey, Signature};
use serde::{Deserialize, Serialize};

use crate::envelope::VoteEnvelope;
use crate::nullifier::nullifier;
use crate::EnvelopeError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tx {
    Vote(VoteEnvelope),
}

impl Tx {
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        bincode::serialize(self).map_err(|e| EnvelopeError::Encoding(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        bincode::deserialize(bytes).map_err(|e| EnvelopeError::Decoding(e.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// Encoded transaction bytes plus the signature over exactly those bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub tx: Vec<u8>,
    /// `None` for anonymous votes.
    pub signature: Option<TxSignature>,
}

impl SignedTx {
    pub fn sign(tx: &Tx, signer: &KeyPair) -> Result<Self, EnvelopeError> {
        let tx = tx.encode()?;
        let signature = sign_message(&tx, &signer.private);
        Ok(Self {
            tx,
            signature: Some(TxSignature {
                public_key: signer.public.clone(),
                signature,
            }),
        })
    }

    pub fn unsigned(tx: &Tx) -> Result<Self, EnvelopeError> {
        Ok(Self {
            tx: tx.encode()?,
            signature: None,
        })
    }

    /// Payload for the gateway's `submitRawTx`.
    pub fn to_base64(&self) -> Result<String, EnvelopeError> {
        let bytes = bincode::serialize(self).map_err(|e| EnvelopeError::Encoding(e.to_string()))?;
        Ok(BASE64.encode(bytes))
    }

    pub fn from_base64(payload: &str) -> Result<Self, EnvelopeError> {
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| EnvelopeError::Decoding(e.to_string()))?;
        bincode::deserialize(&bytes).map_err(|e| EnvelopeError::Decoding(e.to_string()))
    }

    /// Check the signature and recover the envelope with the signer's
    /// address.
    ///
    /// Signed votes must carry the signer's nullifier. Unsigned
    /// transactions are only accepted for anonymous votes, and yield no
    /// address.
    pub fn verify(&self) -> Result<(VoteEnvelope, Option<Address>), EnvelopeError> {
        let Tx::Vote(envelope) = Tx::decode(&self.tx)?;

        let Some(sig) = &self.signature else {
            return if envelope.proof.is_anonymous() {
                Ok((envelope, None))
            } else {
                Err(EnvelopeError::Unsigned)
            };
        };

        if !verify_signature(&self.tx, &sig.signature, &sig.public_key) {
            return Err(EnvelopeError::InvalidSignature);
        }
        let voter = derive_address(&sig.public_key);
        if !envelope.proof.is_anonymous()
            && envelope.nullifier != nullifier(&voter, &envelope.process_id)
        {
            return Err(EnvelopeError::NullifierMismatch);
        }
        Ok((envelope, Some(voter)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::package_vote;
    use ballotlink_census::{CensusProof, TreeKind, TreeProof};
    use ballotlink_crypto::keypair_from_seed;
    use ballotlink_types::{CensusOrigin, ProcessId};

    fn envelope_for(voter: &Address) -> VoteEnvelope {
        package_vote(
            vec![1, 0],
            ProcessId::new([2; 32]),
            CensusOrigin::OffChainTree,
            &CensusProof::Tree(TreeProof {
                kind: TreeKind::Plain,
                siblings: vec![1, 2, 3],
            }),
            voter,
            &[],
        )
        .unwrap()
    }

    #[test]
    fn base64_payload_survives_transport() {
        let signer = keypair_from_seed(&[4; 32]);
        let envelope = envelope_for(&derive_address(&signer.public));
        let signed = SignedTx::sign(&Tx::Vote(envelope.clone()), &signer).unwrap();

        let payload = signed.to_base64().unwrap();
        let decoded = SignedTx::from_base64(&payload).unwrap();
        assert_eq!(decoded, signed);
        let (recovered, voter) = decoded.verify().unwrap();
        assert_eq!(recovered, envelope);
        assert_eq!(voter, Some(derive_address(&signer.public)));
    }

    #[test]
    fn tampered_bytes_fail() {
        let signer = keypair_from_seed(&[4; 32]);
        let envelope = envelope_for(&derive_address(&signer.public));
        let mut signed = SignedTx::sign(&Tx::Vote(envelope), &signer).unwrap();
        let last = signed.tx.len() - 1;
        signed.tx[last] ^= 0x01;
        assert!(signed.verify().is_err());
    }

    #[test]
    fn foreign_nullifier_is_rejected() {
        let signer = keypair_from_seed(&[4; 32]);
        let envelope = envelope_for(&Address::new([0xee; 20]));
        let signed = SignedTx::sign(&Tx::Vote(envelope), &signer).unwrap();
        assert!(matches!(signed.verify(), Err(EnvelopeError::NullifierMismatch)));
    }

    #[test]
    fn unsigned_plain_vote_is_rejected() {
        let envelope = envelope_for(&Address::new([1; 20]));
        let unsigned = SignedTx::unsigned(&Tx::Vote(envelope)).unwrap();
        assert!(matches!(unsigned.verify(), Err(EnvelopeError::Unsigned)));
    }

    #[test]
    fn garbage_payload_is_a_decoding_error() {
        assert!(matches!(
            SignedTx::from_base64("not base64!"),
            Err(EnvelopeError::Decoding(_))
        ));
    }
}
