//! Failure taxonomy shared by the voice subsystem and the companion API client.
//!
//! Every error surfaced to the UI layer classifies itself into one of these
//! kinds. None of them is fatal: after any failure the subsystem that produced
//! it is back in an idle, retryable state.

use serde::{Deserialize, Serialize};

/// Classification of a user-visible failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The host does not provide the requested capability at all.
    CapabilityUnavailable,

    /// The user (or platform policy) refused microphone access.
    PermissionDenied,

    /// The capture device is missing or busy.
    DeviceUnavailable,

    /// A network round-trip failed (host speech service or backend).
    NetworkFailure,

    /// The platform blocked its speech service.
    ServiceBlocked,

    /// The user cancelled the operation.
    UserCanceled,

    /// The operation did not complete within its time budget.
    Timeout,

    /// Input was empty or rejected as invalid.
    ValidationError,

    /// The backend reported an internal error (HTTP 5xx).
    ServerError,

    /// Anything the host reported that we do not recognise.
    UnknownHostError,
}

impl FailureKind {
    /// Stable label used in logs and serialized events.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CapabilityUnavailable => "capability_unavailable",
            Self::PermissionDenied => "permission_denied",
            Self::DeviceUnavailable => "device_unavailable",
            Self::NetworkFailure => "network_failure",
            Self::ServiceBlocked => "service_blocked",
            Self::UserCanceled => "user_canceled",
            Self::Timeout => "timeout",
            Self::ValidationError => "validation_error",
            Self::ServerError => "server_error",
            Self::UnknownHostError => "unknown_host_error",
        }
    }

    /// Whether retrying the same operation could succeed without the user
    /// changing anything on the host.
    ///
    /// Capability, permission and service-policy failures need the user to
    /// act first; everything else is worth another attempt as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::CapabilityUnavailable | Self::PermissionDenied | Self::ServiceBlocked
        )
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
