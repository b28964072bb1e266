//! Voice I/O error types.
//!
//! The display string of every variant is the message shown to the user.

use mhc_core::FailureKind;

use crate::backend::RecognitionErrorCode;

/// Errors surfaced by the recognition and synthesis managers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoiceError {
    /// The host heard nothing before giving up.
    #[error(
        "No speech detected. Please speak clearly and try again. Make sure your microphone is working."
    )]
    NoSpeech,

    /// The capture device is missing or busy.
    #[error("Microphone not available. Please check your microphone connection and try again.")]
    DeviceUnavailable,

    /// Microphone access was refused.
    #[error("Microphone permission denied. Please allow microphone access and try again.")]
    PermissionDenied,

    /// The host's speech service could not be reached.
    #[error("Network error. Check your internet connection and try again.")]
    Network,

    /// The platform has its speech service disabled.
    #[error("Speech service blocked. Please enable speech services in your settings.")]
    ServiceBlocked,

    /// The session was aborted by the user or the host.
    #[error("Voice input was cancelled.")]
    Aborted,

    /// An error code the client does not know.
    #[error("Voice input error: {code}. Please try again.")]
    Host { code: String },

    /// The host refused to begin a recognition session.
    #[error("Failed to start voice recognition")]
    StartFailed(String),

    /// No speech recognition on this host.
    #[error("Voice recognition not available")]
    RecognitionUnavailable,

    /// No speech synthesis on this host.
    #[error("Speech synthesis not supported")]
    SynthesisUnavailable,

    /// No capture device API on this host.
    #[error("Microphone access is not supported on this device")]
    CaptureUnavailable,

    /// The host failed to play an utterance.
    #[error("Audio error: {0}")]
    Synthesis(String),
}

impl VoiceError {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NoSpeech => FailureKind::Timeout,
            Self::DeviceUnavailable => FailureKind::DeviceUnavailable,
            Self::PermissionDenied => FailureKind::PermissionDenied,
            Self::Network => FailureKind::NetworkFailure,
            Self::ServiceBlocked => FailureKind::ServiceBlocked,
            Self::Aborted => FailureKind::UserCanceled,
            Self::Host { .. } | Self::StartFailed(_) | Self::Synthesis(_) => {
                FailureKind::UnknownHostError
            }
            Self::RecognitionUnavailable | Self::SynthesisUnavailable | Self::CaptureUnavailable => {
                FailureKind::CapabilityUnavailable
            }
        }
    }
}

impl From<RecognitionErrorCode> for VoiceError {
    fn from(code: RecognitionErrorCode) -> Self {
        match code {
            RecognitionErrorCode::NoSpeech => Self::NoSpeech,
            RecognitionErrorCode::AudioCapture => Self::DeviceUnavailable,
            RecognitionErrorCode::NotAllowed => Self::PermissionDenied,
            RecognitionErrorCode::Network => Self::Network,
            RecognitionErrorCode::ServiceNotAllowed => Self::ServiceBlocked,
            RecognitionErrorCode::Aborted => Self::Aborted,
            RecognitionErrorCode::Other(code) => Self::Host { code },
        }
    }
}
