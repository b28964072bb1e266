//! States and events published to the UI layer.

use serde::{Deserialize, Serialize};

use crate::error::VoiceError;
use crate::session::SessionToken;

/// Lifecycle of the recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RecognitionState {
    /// No session.
    #[default]
    Idle,

    /// The host was asked to start; waiting for capture to begin.
    AwaitingPermission,

    /// Capture is running.
    Listening,

    /// A final transcript was delivered.
    Resolved,

    /// The session ended with an error.
    Failed,
}

impl RecognitionState {
    /// A session is in flight and a new one would be rejected.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::AwaitingPermission | Self::Listening)
    }
}

/// Lifecycle of one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UtteranceState {
    Queued,
    Speaking,
    Completed,
    Canceled,
    Errored,
}

impl UtteranceState {
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Queued | Self::Speaking)
    }
}

/// Events emitted by the voice managers.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    RecognitionStateChanged(RecognitionState),

    /// Partial hypothesis for live display. Replaced by the next one.
    InterimTranscript(String),

    /// The transcript that ended the session.
    FinalTranscript(String),

    RecognitionFailed(VoiceError),

    UtteranceStateChanged {
        token: SessionToken,
        state: UtteranceState,
    },

    SpeakingStarted(SessionToken),

    SpeakingFinished(SessionToken),

    SpeakingFailed {
        token: SessionToken,
        message: String,
    },

    /// The voice list is empty; synthesis is waiting for it.
    VoicesLoading,

    /// The utterance was submitted but the host never started playing it.
    SpeechStalled(SessionToken),
}

pub(crate) type EventSender = tokio::sync::mpsc::UnboundedSender<VoiceEvent>;

pub(crate) fn emit(tx: &EventSender, event: VoiceEvent) {
    // A closed receiver just means nobody is watching.
    let _ = tx.send(event);
}
