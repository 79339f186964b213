//! HTTP GET returning JSON, behind a trait so the scripture client can be driven
//! without a network in tests.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Fetch failed: {status} from {url}")]
    Status { status: u16, url: String },
    #[error("Response was not valid JSON: {0}")]
    Decode(String),
}

#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError>;
}

/// `reqwest`-backed transport used in production.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bible-nav/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonTransport for ReqwestTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}
