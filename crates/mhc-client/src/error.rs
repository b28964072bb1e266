//! Error types for companion backend requests.
//!
//! Request-time errors are mapped to `mhc_core::ApiError` at the port
//! boundary. Only construction errors reach callers as [`ClientError`].

use mhc_core::FailureKind;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request did not complete within the configured timeout.
    #[error("Request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// The backend answered with a non-success status.
    #[error("Backend request failed with status {status}: {url}")]
    Status {
        status: u16,
        url: String,
        /// Raw response body, kept for the validation detail on 400s.
        body: String,
    },

    /// The backend answered 2xx with a body we cannot use.
    #[error("Invalid response from backend: {message}")]
    InvalidResponse { message: String },

    /// Connection, TLS or client construction error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ClientError {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::Status { status, .. } if *status >= 500 => FailureKind::ServerError,
            Self::Status { status: 400, .. } | Self::InvalidUrl(_) => FailureKind::ValidationError,
            Self::Status { .. }
            | Self::InvalidResponse { .. }
            | Self::Network(_)
            | Self::JsonParse(_) => FailureKind::NetworkFailure,
        }
    }
}
