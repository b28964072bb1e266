//! HTTP backend abstraction for the companion API.
//!
//! The client is generic over [`HttpBackend`] so request building and
//! response mapping can be tested against canned JSON. The production
//! implementation uses reqwest.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::CompanionClientConfig;
use crate::error::{ClientError, ClientResult};

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Sends JSON requests and decodes JSON responses.
///
/// This is an implementation detail - external code should use the
/// `CompanionApiPort` trait.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn post_json<B, T>(&self, url: &Url, body: &B) -> ClientResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send;

    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> ClientResult<T>;

    /// The timeout after which requests fail with `ClientError::Timeout`.
    fn timeout(&self) -> Duration;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend. No retries: a failed message is reported to the
/// user, who can send it again.
pub struct ReqwestBackend {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestBackend {
    pub fn new(config: &CompanionClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }

    fn transport_error(&self, err: reqwest::Error, url: &Url) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                url: url.to_string(),
                timeout_ms: duration_ms(self.timeout),
            }
        } else {
            ClientError::Network(err)
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> ClientResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e, url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = status.as_u16(), "Backend request failed");
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e, url))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn post_json<B, T>(&self, url: &Url, body: &B) -> ClientResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        tracing::debug!(url = %url, "POST");
        self.execute(self.client.post(url.as_str()).json(body), url)
            .await
    }

    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> ClientResult<T> {
        tracing::debug!(url = %url, "GET");
        self.execute(self.client.get(url.as_str()), url).await
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
