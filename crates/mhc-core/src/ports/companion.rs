//! Companion backend port: trait abstraction for the sentiment/chat service.
//!
//! # Design Rules
//!
//! - No HTTP client types in any signature; adapters map their transport
//!   errors into [`ApiError`] at the boundary.
//! - Replies are normalised into [`CompanionReply`] regardless of which
//!   endpoint produced them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CompanionReply, FailureKind};

/// Shown when the request did not complete within the client timeout.
pub const TIMEOUT_MESSAGE: &str = "Request timed out, please try again";
/// Shown when the backend rejected the message (HTTP 400).
pub const INVALID_MESSAGE: &str = "Please provide a valid message";
/// Shown when the backend failed internally (HTTP 5xx).
pub const SERVER_ERROR_MESSAGE: &str = "Server error, please try again later";
/// Shown for every other failure.
pub const UNAVAILABLE_MESSAGE: &str = "Bot is unavailable, please try again";

/// Which backend endpoint a conversation talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatEndpoint {
    /// `POST /analyze {text}`, the web client's flow.
    #[default]
    Analyze,
    /// `POST /chat {message}`, the mobile client's flow.
    Chat,
}

impl ChatEndpoint {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::Chat => "chat",
        }
    }
}

/// Result of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: String,
}

impl BackendHealth {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Errors returned by [`CompanionApiPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The client gave up waiting for the backend.
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The backend rejected the message (HTTP 400).
    #[error("Backend rejected the message: {detail}")]
    InvalidMessage { detail: String },

    /// The backend failed internally (HTTP 5xx).
    #[error("Backend server error (status {status})")]
    Server { status: u16 },

    /// Any other non-success status.
    #[error("Backend request failed with status {status}")]
    Status { status: u16 },

    /// Connection refused, DNS failure, TLS failure and the like.
    #[error("Backend unreachable: {message}")]
    Unreachable { message: String },

    /// The backend answered with a body we could not understand.
    #[error("Invalid response from backend: {message}")]
    InvalidResponse { message: String },

    /// The message was empty before it ever left the client.
    #[error("Message cannot be empty")]
    EmptyMessage,
}

impl ApiError {
    /// The message the UI shows in place of a bot reply.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => TIMEOUT_MESSAGE,
            Self::InvalidMessage { .. } | Self::EmptyMessage => INVALID_MESSAGE,
            Self::Server { .. } => SERVER_ERROR_MESSAGE,
            Self::Status { .. } | Self::Unreachable { .. } | Self::InvalidResponse { .. } => {
                UNAVAILABLE_MESSAGE
            }
        }
    }

    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::Timeout,
            Self::InvalidMessage { .. } | Self::EmptyMessage => FailureKind::ValidationError,
            Self::Server { .. } => FailureKind::ServerError,
            Self::Status { .. } | Self::Unreachable { .. } | Self::InvalidResponse { .. } => {
                FailureKind::NetworkFailure
            }
        }
    }
}

/// Client for the companion backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompanionApiPort: Send + Sync {
    /// `POST /analyze {text}`.
    async fn analyze(&self, text: &str) -> Result<CompanionReply, ApiError>;

    /// `POST /chat {message}`.
    async fn chat(&self, message: &str) -> Result<CompanionReply, ApiError>;

    /// `GET /health`.
    async fn health(&self) -> Result<BackendHealth, ApiError>;
}
