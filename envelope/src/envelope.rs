//! Vote envelopes and the functions that build them.

use ballotlink_census::{AnonymousProof, CaProof, CensusProof, EvmStorageProof, TreeProof};
use ballotlink_crypto::{blake2b_256, derive_address};
use ballotlink_types::{Address, CensusOrigin, KeyPair, Nullifier, ProcessId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nullifier::nullifier;
use crate::package::{encode_vote_package, ProcessKey, VotePackage};
use crate::prover::ZkProver;
use crate::tx::{SignedTx, Tx};
use crate::EnvelopeError;

/// Opaque zero-knowledge membership proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZkProof {
    pub proof: Vec<u8>,
}

/// The census proof as carried on the wire. Anonymous witnesses never
/// appear here, only the proof a prover made from them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvelopeProof {
    Tree(TreeProof),
    Ca(CaProof),
    EvmStorage(EvmStorageProof),
    Zk(ZkProof),
}

impl EnvelopeProof {
    fn from_census(origin: CensusOrigin, proof: &CensusProof) -> Result<Self, EnvelopeError> {
        let mismatch = || EnvelopeError::ProtocolMismatch {
            origin,
            proof: proof.variant_name(),
        };
        if !proof.matches_origin(origin) {
            return Err(mismatch());
        }
        match proof {
            CensusProof::Tree(tree) => Ok(Self::Tree(tree.clone())),
            CensusProof::Ca(ca) => Ok(Self::Ca(ca.clone())),
            CensusProof::EvmStorage(evm) => Ok(Self::EvmStorage(evm.clone())),
            // needs a prover, see `package_anonymous`
            CensusProof::Anonymous(_) => Err(mismatch()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Zk(_))
    }
}

/// One vote, ready to be signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteEnvelope {
    pub process_id: ProcessId,
    pub nonce: [u8; 8],
    /// JSON vote package, or its onion-encrypted form.
    pub vote_package: Vec<u8>,
    /// Process key indexes the package was sealed with, ascending.
    pub encryption_key_indexes: Vec<u32>,
    pub proof: EnvelopeProof,
    pub nullifier: Nullifier,
}

/// Build the envelope for `voter`'s `votes` in a non-anonymous process.
///
/// `public_keys` are the process encryption keys; pass an empty slice for
/// processes without encrypted votes.
pub fn package_vote(
    votes: Vec<u32>,
    process_id: ProcessId,
    origin: CensusOrigin,
    proof: &CensusProof,
    voter: &Address,
    public_keys: &[ProcessKey],
) -> Result<VoteEnvelope, EnvelopeError> {
    let proof = EnvelopeProof::from_census(origin, proof)?;
    let (vote_package, encryption_key_indexes) =
        encode_vote_package(&VotePackage::new(votes), public_keys)?;

    debug!(
        process = %process_id,
        layers = encryption_key_indexes.len(),
        "packaged vote"
    );

    Ok(VoteEnvelope {
        process_id,
        nonce: rand::thread_rng().gen(),
        vote_package,
        encryption_key_indexes,
        proof,
        nullifier: nullifier(voter, &process_id),
    })
}

/// [`package_vote`] for the signer's own address, signed.
pub fn package_signed(
    votes: Vec<u32>,
    process_id: ProcessId,
    origin: CensusOrigin,
    proof: &CensusProof,
    signer: &KeyPair,
    public_keys: &[ProcessKey],
) -> Result<SignedTx, EnvelopeError> {
    let voter = derive_address(&signer.public);
    let envelope = package_vote(votes, process_id, origin, proof, &voter, public_keys)?;
    SignedTx::sign(&Tx::Vote(envelope), signer)
}

/// Build an anonymous vote. The prover turns `witness` into a membership
/// proof bound to the vote package; the transaction is left unsigned.
pub fn package_anonymous(
    votes: Vec<u32>,
    process_id: ProcessId,
    origin: CensusOrigin,
    witness: &AnonymousProof,
    prover: &dyn ZkProver,
    public_keys: &[ProcessKey],
) -> Result<SignedTx, EnvelopeError> {
    if origin != CensusOrigin::OffChainAnonymous {
        return Err(EnvelopeError::ProtocolMismatch {
            origin,
            proof: "anonymous",
        });
    }

    let (vote_package, encryption_key_indexes) =
        encode_vote_package(&VotePackage::new(votes), public_keys)?;
    let output = prover.prove(witness, &process_id, &blake2b_256(&vote_package))?;

    debug!(process = %process_id, "packaged anonymous vote");

    let envelope = VoteEnvelope {
        process_id,
        nonce: rand::thread_rng().gen(),
        vote_package,
        encryption_key_indexes,
        proof: EnvelopeProof::Zk(ZkProof {
            proof: output.proof,
        }),
        nullifier: output.nullifier,
    };
    SignedTx::unsigned(&Tx::Vote(envelope))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::open_vote_package;
    use crate::prover::ZkOutput;
    use ballotlink_census::{resolve, FieldElement, TreeKind};
    use ballotlink_crypto::{blake2b_256_multi, keypair_from_seed, EncryptionKeyPair};
    use serde_json::json;

    fn tree_proof() -> CensusProof {
        CensusProof::Tree(TreeProof {
            kind: TreeKind::Plain,
            siblings: vec![0, 3, 9],
        })
    }

    fn pid() -> ProcessId {
        ProcessId::new([5; 32])
    }

    struct EchoProver;

    impl ZkProver for EchoProver {
        fn prove(
            &self,
            witness: &AnonymousProof,
            process_id: &ProcessId,
            vote_hash: &[u8; 32],
        ) -> Result<ZkOutput, EnvelopeError> {
            Ok(ZkOutput {
                proof: vote_hash.to_vec(),
                nullifier: Nullifier::new(blake2b_256_multi(&[
                    &witness.secret_key.0,
                    process_id.as_bytes(),
                ])),
            })
        }
    }

    #[test]
    fn envelopes_differ_only_in_nonce() {
        let voter = Address::new([1; 20]);
        let build = || {
            package_vote(vec![0, 1], pid(), CensusOrigin::OffChainTree, &tree_proof(), &voter, &[])
                .unwrap()
        };
        let a = build();
        let mut b = build();

        let pa = VotePackage::from_json(&a.vote_package).unwrap();
        let pb = VotePackage::from_json(&b.vote_package).unwrap();
        assert_eq!(pa.votes, pb.votes);
        assert_ne!(pa.nonce, pb.nonce);

        b.nonce = a.nonce;
        b.vote_package = a.vote_package.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn encrypted_envelope_records_indexes() {
        let keys: Vec<EncryptionKeyPair> =
            (0..2u8).map(|i| EncryptionKeyPair::from_secret([i + 1; 32])).collect();
        let public: Vec<ProcessKey> =
            keys.iter().enumerate().map(|(i, k)| ProcessKey::new(i as u32, &k.public)).collect();
        let private: Vec<ProcessKey> =
            keys.iter().enumerate().map(|(i, k)| ProcessKey::new(i as u32, &k.secret)).collect();

        let env = package_vote(
            vec![2],
            pid(),
            CensusOrigin::OffChainTree,
            &tree_proof(),
            &Address::new([1; 20]),
            &public,
        )
        .unwrap();
        assert_eq!(env.encryption_key_indexes, vec![0, 1]);

        let opened = open_vote_package(&env.vote_package, &private, &env.encryption_key_indexes)
            .unwrap();
        assert_eq!(opened.votes, vec![2]);
    }

    #[test]
    fn mismatched_origin_is_rejected() {
        let err = package_vote(
            vec![0],
            pid(),
            CensusOrigin::OffChainCa,
            &tree_proof(),
            &Address::new([1; 20]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::ProtocolMismatch {
                origin: CensusOrigin::OffChainCa,
                proof: "tree"
            }
        ));
    }

    #[test]
    fn anonymous_witness_needs_a_prover() {
        let witness = resolve(
            CensusOrigin::OffChainAnonymous,
            &json!({"secretKey": "0x01", "rollingRoot": "0x02", "siblings": [], "keyIndex": 0}),
        )
        .unwrap();
        let err = package_vote(
            vec![0],
            pid(),
            CensusOrigin::OffChainAnonymous,
            &witness,
            &Address::new([1; 20]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, EnvelopeError::ProtocolMismatch { .. }));
    }

    #[test]
    fn anonymous_envelope_carries_only_the_proof() {
        let witness = AnonymousProof {
            secret_key: FieldElement([7; 32]),
            rolling_root: FieldElement([8; 32]),
            siblings: vec![FieldElement([9; 32])],
            key_index: 1,
        };
        let signed = package_anonymous(
            vec![1],
            pid(),
            CensusOrigin::OffChainAnonymous,
            &witness,
            &EchoProver,
            &[],
        )
        .unwrap();

        assert!(signed.signature.is_none());
        let (envelope, voter) = signed.verify().unwrap();
        assert!(voter.is_none());
        match &envelope.proof {
            EnvelopeProof::Zk(zk) => {
                assert_eq!(zk.proof, blake2b_256(&envelope.vote_package).to_vec())
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!signed.tx.windows(32).any(|w| w == [7u8; 32]));
    }

    #[test]
    fn anonymous_requires_anonymous_origin() {
        let witness = AnonymousProof {
            secret_key: FieldElement([7; 32]),
            rolling_root: FieldElement([8; 32]),
            siblings: vec![],
            key_index: 0,
        };
        assert!(package_anonymous(vec![1], pid(), CensusOrigin::Erc20, &witness, &EchoProver, &[])
            .is_err());
    }

    #[test]
    fn signed_package_uses_signer_nullifier() {
        let signer = keypair_from_seed(&[3; 32]);
        let signed =
            package_signed(vec![0], pid(), CensusOrigin::OffChainTree, &tree_proof(), &signer, &[])
                .unwrap();
        let (envelope, voter) = signed.verify().unwrap();
        let voter = voter.unwrap();
        assert_eq!(voter, derive_address(&signer.public));
        assert_eq!(envelope.nullifier, nullifier(&voter, &pid()));
    }
}
