//! Nullable gateway transport: scripted, signing test gateways.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ballotlink_crypto::keypair_from_seed;
use ballotlink_gateway::{
    GatewayCandidate, GatewayError, GatewayRequest, GatewayResponse, GatewayTransport,
};
use ballotlink_types::{KeyPair, Timestamp};
use serde_json::{json, Map, Value};

use crate::lock;

/// How a test gateway answers one request.
#[derive(Clone, Debug)]
pub enum NullReply {
    /// `ok: true` plus the fields of this object.
    Ok(Value),
    /// `ok: false` with this message.
    Remote(String),
    /// The connection fails with this text.
    Transport(String),
    /// The exchange times out.
    Timeout,
    /// Never answers; the caller's timeout has to fire.
    Hang,
    /// A valid answer signed with the wrong key.
    Forged(Value),
}

/// One request seen by a test gateway.
#[derive(Clone, Debug)]
pub struct NullCall {
    pub uri: String,
    pub request: GatewayRequest,
    pub signed: bool,
}

impl NullCall {
    pub fn method(&self) -> &str {
        self.request.method()
    }
}

struct NullGateway {
    keypair: KeyPair,
    queued: HashMap<String, VecDeque<NullReply>>,
    standing: HashMap<String, NullReply>,
}

/// A set of in-memory gateways keyed by URI.
///
/// Each gateway signs its answers with its own key. Replies are taken from
/// the per-method queue first, then from the standing reply. Unscripted
/// methods get a non-transient `ok: false`.
#[derive(Default)]
pub struct NullTransport {
    gateways: Mutex<HashMap<String, NullGateway>>,
    documents: Mutex<HashMap<String, Vec<u8>>>,
    calls: Mutex<Vec<NullCall>>,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gateway signing with the key derived from `seed` and
    /// return the candidate describing it.
    pub fn add_gateway(&self, uri: &str, seed: u8, methods: &[&str]) -> GatewayCandidate {
        let keypair = keypair_from_seed(&[seed; 32]);
        let candidate = GatewayCandidate {
            uri: uri.to_string(),
            chain_rpc: None,
            public_key: Some(keypair.public.to_hex()),
            methods: methods.iter().map(|m| m.to_string()).collect(),
        };
        lock(&self.gateways).insert(
            uri.to_string(),
            NullGateway {
                keypair,
                queued: HashMap::new(),
                standing: HashMap::new(),
            },
        );
        candidate
    }

    /// Answer `getInfo` with `methods` and `health`.
    pub fn set_info(&self, uri: &str, methods: &[&str], health: u32) {
        self.respond(uri, "getInfo", NullReply::Ok(json!({ "apiList": methods, "health": health })));
    }

    /// Reply to every `method` call on `uri` that has no queued reply.
    pub fn respond(&self, uri: &str, method: &str, reply: NullReply) {
        if let Some(gateway) = lock(&self.gateways).get_mut(uri) {
            gateway.standing.insert(method.to_string(), reply);
        }
    }

    /// Reply once to the next `method` call on `uri`.
    pub fn enqueue(&self, uri: &str, method: &str, reply: NullReply) {
        if let Some(gateway) = lock(&self.gateways).get_mut(uri) {
            gateway
                .queued
                .entry(method.to_string())
                .or_default()
                .push_back(reply);
        }
    }

    /// Serve `bytes` to `fetch(uri)`.
    pub fn set_document(&self, uri: &str, bytes: impl Into<Vec<u8>>) {
        lock(&self.documents).insert(uri.to_string(), bytes.into());
    }

    /// Every request received, in order.
    pub fn calls(&self) -> Vec<NullCall> {
        lock(&self.calls).clone()
    }

    /// URIs that received `method`, in order.
    pub fn calls_to(&self, method: &str) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.method() == method)
            .map(|c| c.uri.clone())
            .collect()
    }

    fn answer(&self, uri: &str, body: &[u8]) -> Result<Result<Vec<u8>, NullReply>, GatewayError> {
        let (id, request) = GatewayRequest::decode(body)?;
        let signed = serde_json::from_slice::<Value>(body)
            .map(|v| v.get("signature").is_some())
            .unwrap_or(false);
        let method = request.method().to_string();
        lock(&self.calls).push(NullCall {
            uri: uri.to_string(),
            request,
            signed,
        });

        let mut gateways = lock(&self.gateways);
        let gateway = gateways
            .get_mut(uri)
            .ok_or_else(|| GatewayError::Transport(format!("connection refused: {uri}")))?;
        let reply = gateway
            .queued
            .get_mut(&method)
            .and_then(VecDeque::pop_front)
            .or_else(|| gateway.standing.get(&method).cloned())
            .unwrap_or_else(|| NullReply::Remote(format!("no reply scripted for {method}")));

        let (fields, signer) = match reply {
            NullReply::Ok(value) => (with_ok(value, true), &gateway.keypair),
            NullReply::Remote(message) => {
                (with_ok(json!({ "message": message }), false), &gateway.keypair)
            }
            NullReply::Forged(value) => {
                let forged = keypair_from_seed(&[0xee; 32]);
                let bytes = GatewayResponse::encode(
                    &id,
                    with_ok(value, true),
                    Timestamp::now(),
                    Some(&forged),
                )?;
                return Ok(Ok(bytes));
            }
            other => return Ok(Err(other)),
        };
        Ok(Ok(GatewayResponse::encode(
            &id,
            fields,
            Timestamp::now(),
            Some(signer),
        )?))
    }
}

fn with_ok(value: Value, ok: bool) -> Map<String, Value> {
    let mut fields = match value {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    fields.insert("ok".into(), Value::Bool(ok));
    fields
}

#[async_trait]
impl GatewayTransport for NullTransport {
    async fn exchange(
        &self,
        uri: &str,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, GatewayError> {
        match self.answer(uri, &body)? {
            Ok(bytes) => Ok(bytes),
            Err(NullReply::Transport(message)) => Err(GatewayError::Transport(message)),
            Err(NullReply::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(GatewayError::Transport("hung up".into()))
            }
            Err(_) => Err(GatewayError::Timeout {
                uri: uri.to_string(),
                ms: timeout.as_millis() as u64,
            }),
        }
    }

    async fn fetch(&self, uri: &str, _timeout: Duration) -> Result<Vec<u8>, GatewayError> {
        lock(&self.documents)
            .get(uri)
            .cloned()
            .ok_or_else(|| GatewayError::Transport(format!("HTTP status 404 Not Found: {uri}")))
    }
}
