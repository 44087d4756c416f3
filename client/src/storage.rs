//! Content-addressed storage for process metadata.
//!
//! A content origin is a comma-separated list of URIs holding the same
//! bytes, optionally followed by `!<blake2b-256 hex>` to pin the content:
//! `ipfs://bafy...,https://cdn.example.org/meta.json!0a1b...`.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ballotlink_crypto::blake2b_256;
use ballotlink_gateway::{GatewayError, GatewayPool, GatewayRequest};
use ballotlink_types::KeyPair;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("content not found at {0}")]
    NotFound(String),

    #[error("content from {uri} does not match hash {expected}")]
    HashMismatch { uri: String, expected: String },

    #[error("invalid content origin {0:?}")]
    InvalidOrigin(String),

    #[error("no origin served the content: {}", .0.join("; "))]
    AllOriginsFailed(Vec<String>),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Fetch and publish content by URI.
#[async_trait]
pub trait ContentStorage: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, StorageError>;

    /// Store `bytes` and return the URI they can be fetched from.
    async fn add(&self, bytes: Vec<u8>, name: &str, signer: &KeyPair)
        -> Result<String, StorageError>;
}

/// Fetch the content behind `origin`, trying each URI in order.
///
/// When the origin pins a hash, content that does not match it counts as a
/// failure of that URI.
pub async fn fetch_content(
    storage: &dyn ContentStorage,
    origin: &str,
) -> Result<Vec<u8>, StorageError> {
    let (uris, expected) = match origin.rsplit_once('!') {
        Some((uris, hash)) => (uris, Some(hash.trim().trim_start_matches("0x").to_lowercase())),
        None => (origin, None),
    };
    let uris: Vec<&str> = uris.split(',').map(str::trim).filter(|u| !u.is_empty()).collect();
    if uris.is_empty() {
        return Err(StorageError::InvalidOrigin(origin.to_string()));
    }

    let mut failures = Vec::with_capacity(uris.len());
    for uri in uris {
        let result = storage.fetch(uri).await.and_then(|bytes| match &expected {
            Some(hash) if hex::encode(blake2b_256(&bytes)) != *hash => {
                Err(StorageError::HashMismatch {
                    uri: uri.to_string(),
                    expected: hash.clone(),
                })
            }
            _ => Ok(bytes),
        });
        match result {
            Ok(bytes) => {
                debug!(uri, size = bytes.len(), "content fetched");
                return Ok(bytes);
            }
            Err(e) => {
                warn!(uri, error = %e, "content origin failed");
                failures.push(e.to_string());
            }
        }
    }
    Err(StorageError::AllOriginsFailed(failures))
}

/// Pin `uri` to the hash of `bytes`.
pub fn pinned_origin(uri: &str, bytes: &[u8]) -> String {
    format!("{uri}!{}", hex::encode(blake2b_256(bytes)))
}

/// [`ContentStorage`] through the gateways' file methods (`fetchFile`,
/// `addFile`).
pub struct GatewayStorage {
    pool: Arc<GatewayPool>,
}

impl GatewayStorage {
    pub fn new(pool: Arc<GatewayPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStorage for GatewayStorage {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, StorageError> {
        let request = GatewayRequest::new("fetchFile").with("uri", uri);
        let response = self.pool.send(&request, None, None).await?;
        let content: String = response
            .field_opt("content")?
            .ok_or_else(|| StorageError::NotFound(uri.to_string()))?;
        BASE64
            .decode(content)
            .map_err(|e| StorageError::Gateway(GatewayError::Codec(e.to_string())))
    }

    async fn add(
        &self,
        bytes: Vec<u8>,
        name: &str,
        signer: &KeyPair,
    ) -> Result<String, StorageError> {
        let request = GatewayRequest::new("addFile")
            .with("type", "ipfs")
            .with("name", name)
            .with("content", BASE64.encode(&bytes));
        let response = self.pool.send(&request, Some(signer), None).await?;
        response
            .field_opt::<String>("uri")?
            .ok_or_else(|| StorageError::Upload("gateway returned no uri".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapStorage(HashMap<&'static str, &'static [u8]>);

    #[async_trait]
    impl ContentStorage for MapStorage {
        async fn fetch(&self, uri: &str) -> Result<Vec<u8>, StorageError> {
            self.0
                .get(uri)
                .map(|b| b.to_vec())
                .ok_or_else(|| StorageError::NotFound(uri.to_string()))
        }

        async fn add(&self, _: Vec<u8>, _: &str, _: &KeyPair) -> Result<String, StorageError> {
            Err(StorageError::Upload("read only".into()))
        }
    }

    fn storage() -> MapStorage {
        MapStorage(HashMap::from([
            ("ipfs://good", &b"metadata"[..]),
            ("https://stale.example.org/m.json", &b"old metadata"[..]),
        ]))
    }

    #[tokio::test]
    async fn falls_through_to_next_origin() {
        let bytes = fetch_content(&storage(), "ipfs://missing, ipfs://good").await.unwrap();
        assert_eq!(bytes, b"metadata");
    }

    #[tokio::test]
    async fn hash_mismatch_skips_origin() {
        let origin = pinned_origin("https://stale.example.org/m.json,ipfs://good", b"metadata");
        assert_eq!(fetch_content(&storage(), &origin).await.unwrap(), b"metadata");

        let only_stale = pinned_origin("https://stale.example.org/m.json", b"metadata");
        match fetch_content(&storage(), &only_stale).await {
            Err(StorageError::AllOriginsFailed(reasons)) => {
                assert_eq!(reasons.len(), 1);
                assert!(reasons[0].contains("does not match"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn hash_accepts_prefix_and_case() {
        let hash = hex::encode(blake2b_256(b"metadata")).to_uppercase();
        let origin = format!("ipfs://good!0x{hash}");
        assert!(fetch_content(&storage(), &origin).await.is_ok());
    }

    #[tokio::test]
    async fn empty_origin_is_invalid() {
        assert!(matches!(
            fetch_content(&storage(), " , ").await,
            Err(StorageError::InvalidOrigin(_))
        ));
    }
}
