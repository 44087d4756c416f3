//! Moving request bytes to a gateway and back.

use std::time::Duration;

use async_trait::async_trait;

use crate::GatewayError;

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Byte-level access to gateways and bootnode documents.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// POST a JSON request body to a gateway and return the answer body.
    async fn exchange(
        &self,
        uri: &str,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, GatewayError>;

    /// GET a document, e.g. the bootnode list.
    async fn fetch(&self, uri: &str, timeout: Duration) -> Result<Vec<u8>, GatewayError>;
}

/// [`GatewayTransport`] over HTTP(S).
pub struct HttpTransport {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http_client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn map_send_error(uri: &str, timeout: Duration, e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout {
            uri: uri.to_string(),
            ms: timeout.as_millis() as u64,
        }
    } else if e.is_connect() {
        GatewayError::Transport(format!("connection failed: {e}"))
    } else {
        GatewayError::Transport(e.to_string())
    }
}

async fn read_body(uri: &str, response: reqwest::Response) -> Result<Vec<u8>, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let text = if status == reqwest::StatusCode::SERVICE_UNAVAILABLE {
            "service unavailable".to_string()
        } else {
            format!("HTTP status {status}")
        };
        return Err(GatewayError::Transport(format!("{uri}: {text}")));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Transport(format!("{uri}: reading body failed: {e}")))?;
    Ok(bytes.to_vec())
}

#[async_trait]
impl GatewayTransport for HttpTransport {
    async fn exchange(
        &self,
        uri: &str,
        body: Vec<u8>,
        timeout: Duration,
    ) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .http_client
            .post(uri)
            .timeout(timeout)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| map_send_error(uri, timeout, e))?;
        read_body(uri, response).await
    }

    async fn fetch(&self, uri: &str, timeout: Duration) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .http_client
            .get(uri)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_send_error(uri, timeout, e))?;
        read_body(uri, response).await
    }
}
