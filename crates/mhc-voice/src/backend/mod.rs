//! Host speech capabilities: engine-agnostic interfaces for recognition,
//! synthesis and microphone capture.
//!
//! The managers never assume a capability exists. [`SpeechHost`] is probed
//! once per manager and each capability comes back as an `Option`; `None`
//! is an ordinary "unsupported" state, not an error.
//!
//! Host callbacks are delivered through sinks handed to the backend when a
//! session or utterance starts. Each sink is bound to the
//! [`SessionToken`](crate::SessionToken) it was issued for, which is how the
//! managers tell current events from stale ones.

mod capture;
mod recognition;
mod synthesis;

use std::sync::Arc;

pub use capture::{CaptureDevice, CaptureTrack};
pub use recognition::{
    RecognitionBackend, RecognitionConfig, RecognitionErrorCode, RecognitionEvent,
    RecognitionEventSink, TranscriptSegment,
};
pub(crate) use recognition::{RecognitionSignal, TaggedRecognitionEvent};
pub use synthesis::{
    HostVoice, SynthesisBackend, Utterance, UtteranceSink, VoicesChangedNotifier,
};
pub(crate) use synthesis::{UtteranceObserver, UtteranceSignal};

/// Capability probe for the platform's speech APIs.
pub trait SpeechHost: Send + Sync {
    /// Speech-to-text, if the host has it.
    fn recognition(&self) -> Option<Arc<dyn RecognitionBackend>>;

    /// Text-to-speech, if the host has it.
    fn synthesis(&self) -> Option<Arc<dyn SynthesisBackend>>;

    /// Microphone access for permission checks, if the host has it.
    fn capture(&self) -> Option<Arc<dyn CaptureDevice>>;
}
