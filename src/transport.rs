//! HTTP transport collaborator.
//!
//! The pipeline only needs "issue a POST, get bytes back". That contract
//! lives behind the [`Transport`] trait so the session/pipeline state
//! machines can be exercised against a scripted in-memory transport.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::{Error, Result};

const USER_AGENT: &str = concat!("pianoforte/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Asynchronous POST transport; exactly one completion per call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` with a JSON content type, returning the raw
    /// response bytes.
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// reqwest-backed transport used in production.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        trace!(url, body_len = body.len(), "TX: POST");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        debug!(%status, "RX: response");

        if !status.is_success() {
            return Err(Error::Protocol(format!("HTTP status {status}")));
        }

        let bytes = response.bytes().await?;
        trace!(len = bytes.len(), "RX: body");
        Ok(bytes.to_vec())
    }
}
