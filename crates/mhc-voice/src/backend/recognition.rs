use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::VoiceError;
use crate::session::SessionToken;

// ── Session template ───────────────────────────────────────────────

/// How the host should run a recognition session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Keep listening after the first final result.
    pub continuous: bool,

    /// Deliver partial hypotheses while the user is still speaking.
    pub interim_results: bool,

    /// Alternatives per result.
    pub max_alternatives: u8,

    /// BCP 47 language tag.
    pub language: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            interim_results: true,
            max_alternatives: 1,
            language: "en-US".to_string(),
        }
    }
}

// ── Host events ────────────────────────────────────────────────────

/// One result slot of a recognition event (its top alternative).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub is_final: bool,
}

impl TranscriptSegment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Error codes a recognition host reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionErrorCode {
    NoSpeech,
    AudioCapture,
    NotAllowed,
    Network,
    ServiceNotAllowed,
    Aborted,
    Other(String),
}

impl RecognitionErrorCode {
    /// Parse the host's wire code (`no-speech`, `not-allowed`, ...).
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code {
            "no-speech" => Self::NoSpeech,
            "audio-capture" => Self::AudioCapture,
            "not-allowed" => Self::NotAllowed,
            "network" => Self::Network,
            "service-not-allowed" => Self::ServiceNotAllowed,
            "aborted" => Self::Aborted,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_code(&self) -> &str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::AudioCapture => "audio-capture",
            Self::NotAllowed => "not-allowed",
            Self::Network => "network",
            Self::ServiceNotAllowed => "service-not-allowed",
            Self::Aborted => "aborted",
            Self::Other(code) => code,
        }
    }
}

/// Something the host reported about a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Capture began; permission has been granted.
    Started,

    /// New or updated results. Only `results[result_index..]` are new.
    Result {
        result_index: usize,
        results: Vec<TranscriptSegment>,
    },

    /// The session failed.
    Error(RecognitionErrorCode),

    /// The host finished the session.
    Ended,
}

#[derive(Debug)]
pub(crate) enum RecognitionSignal {
    Host(RecognitionEvent),
    /// Posted by the manager itself when the session is stopped.
    Stopped,
}

#[derive(Debug)]
pub(crate) struct TaggedRecognitionEvent {
    pub token: SessionToken,
    pub signal: RecognitionSignal,
}

/// Where a backend delivers the events of one session.
///
/// Cheap to clone. Events sent after the session ended are dropped by the
/// manager.
#[derive(Debug, Clone)]
pub struct RecognitionEventSink {
    token: SessionToken,
    tx: mpsc::UnboundedSender<TaggedRecognitionEvent>,
}

impl RecognitionEventSink {
    pub(crate) const fn new(
        token: SessionToken,
        tx: mpsc::UnboundedSender<TaggedRecognitionEvent>,
    ) -> Self {
        Self { token, tx }
    }

    pub const fn token(&self) -> SessionToken {
        self.token
    }

    pub fn started(&self) {
        self.send(RecognitionEvent::Started);
    }

    pub fn result(&self, result_index: usize, results: Vec<TranscriptSegment>) {
        self.send(RecognitionEvent::Result {
            result_index,
            results,
        });
    }

    pub fn error(&self, code: RecognitionErrorCode) {
        self.send(RecognitionEvent::Error(code));
    }

    pub fn ended(&self) {
        self.send(RecognitionEvent::Ended);
    }

    pub fn send(&self, event: RecognitionEvent) {
        // The manager owns the receiver for its whole lifetime; a failed send
        // only happens during teardown.
        let _ = self.tx.send(TaggedRecognitionEvent {
            token: self.token,
            signal: RecognitionSignal::Host(event),
        });
    }
}

// ── Backend trait ──────────────────────────────────────────────────

/// Host speech-to-text.
///
/// Implementations deliver events through the sink passed to
/// [`start`](Self::start), from any thread, in host order.
pub trait RecognitionBackend: Send + Sync {
    /// Begin a session. An `Err` means the host refused to start.
    fn start(
        &self,
        config: &RecognitionConfig,
        sink: RecognitionEventSink,
    ) -> Result<(), VoiceError>;

    /// Finish gracefully, delivering any pending result.
    fn stop(&self);

    /// Cancel immediately and discard pending results.
    fn abort(&self);
}
