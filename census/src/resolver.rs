//! Origin-keyed resolution of raw census proof payloads.

use ballotlink_types::{decode_hex, Address, CensusOrigin};
use serde_json::{Map, Value};

use crate::proof::{
    AnonymousProof, CaProof, CaSignatureType, CensusProof, EvmStorageProof, FieldElement,
    TreeKind, TreeProof,
};
use crate::ValidationError;

/// Turn the payload a census service returned into the proof `origin`
/// requires.
///
/// The variant is picked from `origin` only. A payload that would be valid
/// for another origin is rejected.
pub fn resolve(origin: CensusOrigin, raw: &Value) -> Result<CensusProof, ValidationError> {
    match origin {
        CensusOrigin::OffChainTree => resolve_tree(TreeKind::Plain, raw),
        CensusOrigin::OffChainTreeWeighted => resolve_tree(TreeKind::Weighted, raw),
        CensusOrigin::OffChainCa => resolve_ca(raw),
        CensusOrigin::Erc20 | CensusOrigin::Erc721 | CensusOrigin::Erc1155 | CensusOrigin::Erc777 => {
            resolve_evm(raw)
        }
        CensusOrigin::OffChainAnonymous => resolve_anonymous(raw),
    }
}

fn resolve_tree(kind: TreeKind, raw: &Value) -> Result<CensusProof, ValidationError> {
    let siblings = match raw {
        Value::Object(map) => {
            let map = exact_fields(map, &["siblings"])?;
            byte_blob(required(map, "siblings")?, "siblings")?
        }
        other => byte_blob(other, "siblings")?,
    };
    Ok(CensusProof::Tree(TreeProof { kind, siblings }))
}

fn resolve_ca(raw: &Value) -> Result<CensusProof, ValidationError> {
    let map = object(raw)?;
    let map = exact_fields(map, &["type", "voterAddress", "signature"])?;

    let type_name = string(required(map, "type")?, "type")?;
    let signature_type = CaSignatureType::parse(type_name).ok_or_else(|| {
        ValidationError::new("type", format!("unknown signature type {type_name:?}"))
    })?;

    let voter_address = Address::from_hex(string(required(map, "voterAddress")?, "voterAddress")?)
        .map_err(|e| ValidationError::new("voterAddress", e.to_string()))?;

    let signature = hex_string(required(map, "signature")?, "signature")?;
    if signature.is_empty() {
        return Err(ValidationError::new("signature", "empty"));
    }

    Ok(CensusProof::Ca(CaProof {
        signature_type,
        voter_address,
        signature,
    }))
}

fn resolve_evm(raw: &Value) -> Result<CensusProof, ValidationError> {
    let map = object(raw)?;
    let map = exact_fields(map, &["key", "value", "proof"])?;

    let key = hex_string(required(map, "key")?, "key")?;
    let value = hex_string(required(map, "value")?, "value")?;
    let siblings = required(map, "proof")?
        .as_array()
        .ok_or_else(|| ValidationError::new("proof", "expected an array"))?
        .iter()
        .enumerate()
        .map(|(i, node)| hex_string(node, &format!("proof[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CensusProof::EvmStorage(EvmStorageProof {
        key,
        value,
        siblings,
    }))
}

fn resolve_anonymous(raw: &Value) -> Result<CensusProof, ValidationError> {
    let map = object(raw)?;
    let map = exact_fields(map, &["secretKey", "rollingRoot", "siblings", "keyIndex"])?;

    let secret_key = field_element(required(map, "secretKey")?, "secretKey")?;
    let rolling_root = field_element(required(map, "rollingRoot")?, "rollingRoot")?;
    let siblings = required(map, "siblings")?
        .as_array()
        .ok_or_else(|| ValidationError::new("siblings", "expected an array"))?
        .iter()
        .enumerate()
        .map(|(i, s)| field_element(s, &format!("siblings[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    let key_index = required(map, "keyIndex")?
        .as_u64()
        .ok_or_else(|| ValidationError::new("keyIndex", "expected a non-negative integer"))?;

    Ok(CensusProof::Anonymous(AnonymousProof {
        secret_key,
        rolling_root,
        siblings,
        key_index,
    }))
}

fn object(raw: &Value) -> Result<&Map<String, Value>, ValidationError> {
    raw.as_object()
        .ok_or_else(|| ValidationError::new("proof", "expected an object"))
}

/// Fails on the first key outside `allowed`.
fn exact_fields<'a>(
    map: &'a Map<String, Value>,
    allowed: &[&str],
) -> Result<&'a Map<String, Value>, ValidationError> {
    match map.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(extra) => Err(ValidationError::new(extra.as_str(), "unexpected field")),
        None => Ok(map),
    }
}

fn required<'a>(map: &'a Map<String, Value>, field: &str) -> Result<&'a Value, ValidationError> {
    map.get(field)
        .ok_or_else(|| ValidationError::new(field, "missing"))
}

fn string<'a>(value: &'a Value, field: &str) -> Result<&'a str, ValidationError> {
    value
        .as_str()
        .ok_or_else(|| ValidationError::new(field, "expected a string"))
}

fn hex_string(value: &Value, field: &str) -> Result<Vec<u8>, ValidationError> {
    decode_hex(string(value, field)?).map_err(|e| ValidationError::new(field, e.to_string()))
}

/// A hex string or an array of byte values.
fn byte_blob(value: &Value, field: &str) -> Result<Vec<u8>, ValidationError> {
    match value {
        Value::String(_) => hex_string(value, field),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| ValidationError::new(field, "array entries must be bytes"))
            })
            .collect(),
        _ => Err(ValidationError::new(
            field,
            "expected a hex string or byte array",
        )),
    }
}

fn field_element(value: &Value, field: &str) -> Result<FieldElement, ValidationError> {
    let bytes = hex_string(value, field)?;
    FieldElement::from_be_slice(&bytes)
        .ok_or_else(|| ValidationError::new(field, "longer than 32 bytes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL_ORIGINS: [CensusOrigin; 8] = [
        CensusOrigin::OffChainTree,
        CensusOrigin::OffChainTreeWeighted,
        CensusOrigin::OffChainCa,
        CensusOrigin::Erc20,
        CensusOrigin::Erc721,
        CensusOrigin::Erc1155,
        CensusOrigin::Erc777,
        CensusOrigin::OffChainAnonymous,
    ];

    fn ca_payload() -> Value {
        json!({
            "type": "ecdsa_pidsalted",
            "voterAddress": "0x00112233445566778899aabbccddeeff00112233",
            "signature": "0xdeadbeef",
        })
    }

    fn evm_payload() -> Value {
        json!({
            "key": "0x01",
            "value": "0x0de0b6b3a7640000",
            "proof": ["0xf851", "0xe218"],
        })
    }

    fn anonymous_payload() -> Value {
        let root = format!("0x{}", "11".repeat(32));
        json!({
            "secretKey": "0x0102",
            "rollingRoot": root,
            "siblings": ["0x03", "0x04"],
            "keyIndex": 7,
        })
    }

    fn tree_payload() -> Value {
        json!({ "siblings": "0x0003000000000000000000000000000000000000000000000000000000000006" })
    }

    #[test]
    fn tree_accepts_hex_bytes_and_object() {
        let from_hex = resolve(CensusOrigin::OffChainTree, &json!("0x0a0b")).unwrap();
        let from_bytes = resolve(CensusOrigin::OffChainTree, &json!([10, 11])).unwrap();
        let from_obj = resolve(CensusOrigin::OffChainTree, &json!({"siblings": "0a0b"})).unwrap();
        assert_eq!(from_hex, from_bytes);
        assert_eq!(from_hex, from_obj);
        match from_hex {
            CensusProof::Tree(t) => {
                assert_eq!(t.kind, TreeKind::Plain);
                assert_eq!(t.siblings, vec![10, 11]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn weighted_origin_yields_weighted_tree() {
        let proof = resolve(CensusOrigin::OffChainTreeWeighted, &tree_payload()).unwrap();
        assert!(proof.matches_origin(CensusOrigin::OffChainTreeWeighted));
        assert!(!proof.matches_origin(CensusOrigin::OffChainTree));
    }

    #[test]
    fn tree_rejects_non_bytes() {
        let err = resolve(CensusOrigin::OffChainTree, &json!([1, 300])).unwrap_err();
        assert_eq!(err.field, "siblings");
        assert!(resolve(CensusOrigin::OffChainTree, &json!("zz")).is_err());
        assert!(resolve(CensusOrigin::OffChainTree, &json!(42)).is_err());
    }

    #[test]
    fn ca_payload_resolves() {
        match resolve(CensusOrigin::OffChainCa, &ca_payload()).unwrap() {
            CensusProof::Ca(ca) => {
                assert_eq!(ca.signature_type, CaSignatureType::EcdsaPidSalted);
                assert_eq!(ca.signature, vec![0xde, 0xad, 0xbe, 0xef]);
                assert_eq!(ca.voter_address.as_bytes()[1], 0x11);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ca_rejects_evm_lookalike() {
        let mut payload = ca_payload();
        payload["key"] = json!("0x01");
        let err = resolve(CensusOrigin::OffChainCa, &payload).unwrap_err();
        assert_eq!(err.field, "key");
    }

    #[test]
    fn ca_rejects_wrong_primitive_types() {
        let mut payload = ca_payload();
        payload["signature"] = json!([1, 2, 3]);
        assert_eq!(
            resolve(CensusOrigin::OffChainCa, &payload).unwrap_err().field,
            "signature"
        );

        let mut payload = ca_payload();
        payload["type"] = json!("rsa");
        assert_eq!(
            resolve(CensusOrigin::OffChainCa, &payload).unwrap_err().field,
            "type"
        );

        let mut payload = ca_payload();
        payload["voterAddress"] = json!("0x0011");
        assert_eq!(
            resolve(CensusOrigin::OffChainCa, &payload).unwrap_err().field,
            "voterAddress"
        );
    }

    #[test]
    fn evm_validates_each_node() {
        let mut payload = evm_payload();
        payload["proof"] = json!(["0xf851", 5]);
        let err = resolve(CensusOrigin::Erc20, &payload).unwrap_err();
        assert_eq!(err.field, "proof[1]");

        let mut payload = evm_payload();
        payload["proof"] = json!("0xf851");
        assert_eq!(resolve(CensusOrigin::Erc721, &payload).unwrap_err().field, "proof");

        let mut payload = evm_payload();
        payload.as_object_mut().unwrap().remove("value");
        assert_eq!(resolve(CensusOrigin::Erc777, &payload).unwrap_err().field, "value");
    }

    #[test]
    fn anonymous_payload_resolves() {
        match resolve(CensusOrigin::OffChainAnonymous, &anonymous_payload()).unwrap() {
            CensusProof::Anonymous(a) => {
                assert_eq!(a.key_index, 7);
                assert_eq!(a.secret_key.0[30..], [1, 2]);
                assert_eq!(a.siblings.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn anonymous_rejects_negative_index() {
        let mut payload = anonymous_payload();
        payload["keyIndex"] = json!(-1);
        assert_eq!(
            resolve(CensusOrigin::OffChainAnonymous, &payload).unwrap_err().field,
            "keyIndex"
        );
    }

    #[test]
    fn every_cross_combination_fails() {
        let payloads = [
            ("tree", tree_payload()),
            ("ca", ca_payload()),
            ("evm", evm_payload()),
            ("anonymous", anonymous_payload()),
        ];
        for origin in ALL_ORIGINS {
            let expected = match origin {
                CensusOrigin::OffChainTree | CensusOrigin::OffChainTreeWeighted => "tree",
                CensusOrigin::OffChainCa => "ca",
                CensusOrigin::OffChainAnonymous => "anonymous",
                _ => "evm",
            };
            for (shape, payload) in &payloads {
                let result = resolve(origin, payload);
                if *shape == expected {
                    let proof = result.unwrap();
                    assert!(proof.matches_origin(origin), "{origin:?}");
                } else {
                    assert!(result.is_err(), "{origin:?} accepted a {shape} payload");
                }
            }
        }
    }
}
