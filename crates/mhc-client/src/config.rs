//! Public configuration for the companion client.

use std::time::Duration;

use mhc_core::DEFAULT_API_BASE_URL;

/// Default request timeout, matching the web client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the companion client.
///
/// # Example
///
/// ```
/// use mhc_client::CompanionClientConfig;
/// use std::time::Duration;
///
/// let config = CompanionClientConfig::new()
///     .with_base_url("http://10.0.2.2:8000")
///     .with_timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct CompanionClientConfig {
    /// Backend root; endpoint paths are joined onto it.
    pub(crate) base_url: String,
    pub(crate) user_agent: String,
    pub(crate) timeout: Duration,
}

impl Default for CompanionClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: concat!("mhc-client/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CompanionClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults to `http://127.0.0.1:8000`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the whole-request timeout.
    ///
    /// Defaults to 10 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
