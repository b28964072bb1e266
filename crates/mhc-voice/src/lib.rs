#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub mod backend;
pub mod capture;
pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod recognition;
pub mod session;
pub mod synthesis;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export key types for convenience
pub use backend::{
    CaptureDevice, CaptureTrack, HostVoice, RecognitionBackend, RecognitionConfig,
    RecognitionErrorCode, RecognitionEvent, RecognitionEventSink, SpeechHost, SynthesisBackend,
    TranscriptSegment, Utterance, UtteranceSink, VoicesChangedNotifier,
};
pub use capture::CaptureGrant;
pub use catalog::VoiceCatalog;
pub use coordinator::{VoiceCapabilities, VoiceCoordinator, VoiceCoordinatorConfig, VoiceInputOutcome};
pub use error::VoiceError;
pub use events::{RecognitionState, UtteranceState, VoiceEvent};
pub use recognition::{RecognitionSessionManager, SessionEnd};
pub use session::{SessionToken, TokenIssuer};
pub use synthesis::{
    DEFAULT_PITCH, DEFAULT_RATE, SpeakOptions, SynthesisSessionManager, SynthesisTiming,
};
