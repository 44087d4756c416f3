//! Nullable content storage: an in-memory URI map.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use ballotlink_client::{ContentStorage, StorageError};
use ballotlink_types::KeyPair;

use crate::lock;

#[derive(Default)]
pub struct NullStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
    uploads: Mutex<Vec<String>>,
}

impl NullStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` at `uri`.
    pub fn put(&self, uri: &str, bytes: impl Into<Vec<u8>>) {
        lock(&self.files).insert(uri.to_string(), bytes.into());
    }

    /// URIs handed out by `add`, in order.
    pub fn uploads(&self) -> Vec<String> {
        lock(&self.uploads).clone()
    }
}

#[async_trait]
impl ContentStorage for NullStorage {
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, StorageError> {
        lock(&self.files)
            .get(uri)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(uri.to_string()))
    }

    async fn add(
        &self,
        bytes: Vec<u8>,
        name: &str,
        _signer: &KeyPair,
    ) -> Result<String, StorageError> {
        let mut uploads = lock(&self.uploads);
        let uri = format!("null://{}/{name}", uploads.len());
        lock(&self.files).insert(uri.clone(), bytes);
        uploads.push(uri.clone());
        Ok(uri)
    }
}
