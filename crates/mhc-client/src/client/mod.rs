//! Companion backend client.

mod endpoints;

use url::Url;

use crate::config::CompanionClientConfig;
use crate::error::ClientResult;
use crate::http::{HttpBackend, ReqwestBackend};

// ============================================================================
// Type Aliases
// ============================================================================

/// Companion client using the reqwest HTTP backend.
pub type DefaultCompanionClient = CompanionClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the companion backend, generic over its HTTP backend.
///
/// External code should use [`DefaultCompanionClient`] through the
/// `CompanionApiPort` trait.
pub struct CompanionClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) base_url: Url,
}

impl DefaultCompanionClient {
    /// Create a client. Fails on a malformed base URL.
    pub fn new(config: &CompanionClientConfig) -> ClientResult<Self> {
        let base_url = parse_base_url(&config.base_url)?;
        let backend = ReqwestBackend::new(config)?;
        tracing::debug!(base_url = %base_url, timeout_ms = config.timeout.as_millis(), "Companion client ready");
        Ok(Self { backend, base_url })
    }

    pub fn default_client() -> ClientResult<Self> {
        Self::new(&CompanionClientConfig::default())
    }
}

impl<B: HttpBackend> CompanionClient<B> {
    /// Create a client with a custom backend.
    #[cfg(test)]
    pub(crate) fn with_backend(base_url: &str, backend: B) -> ClientResult<Self> {
        Ok(Self {
            backend,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }
}

/// Parse the base URL, making sure it ends in `/` so endpoint paths are
/// appended rather than replacing its last segment.
fn parse_base_url(raw: &str) -> ClientResult<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
