//! The signed JSON envelope every gateway exchange uses.
//!
//! Request:  `{"id", "request": {"method", "timestamp", ...}, "signature"?}`
//! Response: `{"id", "response": {"ok", "message"?, "request", "timestamp", ...}, "signature"}`
//!
//! Signatures are ed25519 over the canonical (sorted-key) JSON of the inner
//! object, hex encoded.

use ballotlink_crypto::{sign_json, verify_json};
use ballotlink_types::{KeyPair, PublicKey, Signature, Timestamp};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::GatewayError;

/// Fresh random request id.
pub fn new_request_id() -> String {
    let bytes: [u8; 10] = rand::thread_rng().gen();
    hex::encode(bytes)
}

/// A method call with its named arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayRequest {
    method: String,
    fields: Map<String, Value>,
}

impl GatewayRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            fields: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Wire body for this request, signed when `signer` is given.
    pub fn encode(
        &self,
        id: &str,
        timestamp: Timestamp,
        signer: Option<&KeyPair>,
    ) -> Result<Vec<u8>, GatewayError> {
        let mut inner = self.fields.clone();
        inner.insert("method".into(), Value::from(self.method.clone()));
        inner.insert("timestamp".into(), Value::from(timestamp.as_secs()));
        let inner = Value::Object(inner);

        let mut body = Map::new();
        body.insert("id".into(), Value::from(id));
        if let Some(signer) = signer {
            let signature = sign_json(&inner, &signer.private);
            body.insert("signature".into(), Value::from(signature.to_hex()));
        }
        body.insert("request".into(), inner);
        Ok(serde_json::to_vec(&Value::Object(body))?)
    }

    /// Parse a wire body back into its id and request. Used by test
    /// gateways.
    pub fn decode(bytes: &[u8]) -> Result<(String, Self), GatewayError> {
        let body: Value = serde_json::from_slice(bytes)?;
        let id = body
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| GatewayError::Codec("request without id".into()))?
            .to_string();
        let mut fields = body
            .get("request")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| GatewayError::Codec("request without body".into()))?;
        let method = match fields.remove("method") {
            Some(Value::String(m)) => m,
            _ => return Err(GatewayError::Codec("request without method".into())),
        };
        fields.remove("timestamp");
        Ok((id, Self { method, fields }))
    }
}

/// The inner `response` object of a verified gateway answer.
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayResponse {
    pub id: String,
    fields: Map<String, Value>,
}

impl GatewayResponse {
    /// Parse an answer to request `expected_id`.
    ///
    /// When `public_key` is set the signature must be present and valid.
    pub fn decode(
        bytes: &[u8],
        expected_id: &str,
        public_key: Option<&PublicKey>,
        uri: &str,
    ) -> Result<Self, GatewayError> {
        let body: Value = serde_json::from_slice(bytes)?;
        let inner = body
            .get("response")
            .ok_or_else(|| GatewayError::Codec("answer without response".into()))?;

        if let Some(key) = public_key {
            let signature = body
                .get("signature")
                .and_then(Value::as_str)
                .and_then(|s| Signature::from_hex(s).ok())
                .ok_or_else(|| GatewayError::InvalidSignature(uri.to_string()))?;
            if !verify_json(inner, &signature, key) {
                return Err(GatewayError::InvalidSignature(uri.to_string()));
            }
        }

        let fields = inner
            .as_object()
            .cloned()
            .ok_or_else(|| GatewayError::Codec("response is not an object".into()))?;
        let echoed = fields.get("request").and_then(Value::as_str);
        if echoed != Some(expected_id) {
            return Err(GatewayError::Codec(format!(
                "answer for request {echoed:?}, expected {expected_id}"
            )));
        }

        Ok(Self {
            id: expected_id.to_string(),
            fields,
        })
    }

    /// Build a signed answer to `request_id`. Used by test gateways.
    pub fn encode(
        request_id: &str,
        mut fields: Map<String, Value>,
        timestamp: Timestamp,
        signer: Option<&KeyPair>,
    ) -> Result<Vec<u8>, GatewayError> {
        fields.insert("request".into(), Value::from(request_id));
        fields.insert("timestamp".into(), Value::from(timestamp.as_secs()));
        let inner = Value::Object(fields);

        let mut body = Map::new();
        body.insert("id".into(), Value::from(request_id));
        if let Some(signer) = signer {
            body.insert(
                "signature".into(),
                Value::from(sign_json(&inner, &signer.private).to_hex()),
            );
        }
        body.insert("response".into(), inner);
        Ok(serde_json::to_vec(&Value::Object(body))?)
    }

    pub fn ok(&self) -> bool {
        self.fields.get("ok").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn message(&self) -> Option<&str> {
        self.fields.get("message").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Deserialize a required field.
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Result<T, GatewayError> {
        self.field_opt(key)?
            .ok_or_else(|| GatewayError::Codec(format!("missing field `{key}`")))
    }

    /// Deserialize a field that may be absent or null.
    pub fn field_opt<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, GatewayError> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| GatewayError::Codec(format!("field `{key}`: {e}"))),
        }
    }
}
