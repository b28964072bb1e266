//! Voice I/O coordinator: the recognition and synthesis managers behind one
//! façade, with a single event stream for the UI.
//!
//! ```text
//!   toggle_listening ─► mic check ─► RecognitionSessionManager ─► transcript
//!   speak_reply ───────────────────► SynthesisSessionManager ───► audio
//!                          │
//!                          └── VoiceEvent channel ──► UI
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::backend::SpeechHost;
use crate::error::VoiceError;
use crate::events::{VoiceEvent, emit};
use crate::recognition::{RecognitionSessionManager, SessionEnd};
use crate::synthesis::{
    DEFAULT_PITCH, DEFAULT_RATE, SpeakOptions, SynthesisSessionManager, SynthesisTiming,
};

// ── Configuration ──────────────────────────────────────────────────

/// Configuration for the voice coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceCoordinatorConfig {
    /// Recognition language (BCP 47).
    pub language: String,

    /// Options used for spoken replies.
    pub speak: SpeakOptions,

    /// Synthesis settle, catalog and watchdog delays.
    pub timing: SynthesisTiming,

    /// Whether bot replies should be spoken without being asked.
    pub auto_speak: bool,
}

impl Default for VoiceCoordinatorConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            speak: SpeakOptions {
                rate: Some(DEFAULT_RATE),
                pitch: Some(DEFAULT_PITCH),
                voice: None,
            },
            timing: SynthesisTiming::default(),
            auto_speak: false,
        }
    }
}

/// What the host turned out to support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCapabilities {
    pub recognition: bool,
    pub synthesis: bool,
}

/// Result of [`VoiceCoordinator::toggle_listening`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceInputOutcome {
    /// The user said something.
    Transcript(String),
    /// A session was running and has been stopped.
    Stopped,
    /// The microphone check or the session failed.
    Failed(VoiceError),
    /// The host has no speech recognition.
    Unsupported,
    /// Another session started in the meantime.
    Busy,
    /// The host ended the session without hearing anything final.
    Ended,
}

// ── Coordinator ────────────────────────────────────────────────────

/// Owns both session managers and the event channel.
pub struct VoiceCoordinator {
    recognition: RecognitionSessionManager,
    synthesis: SynthesisSessionManager,
    config: VoiceCoordinatorConfig,
    event_tx: mpsc::UnboundedSender<VoiceEvent>,
}

impl VoiceCoordinator {
    /// Create a coordinator.
    ///
    /// Returns the coordinator and a receiver for [`VoiceEvent`]s.
    #[must_use]
    pub fn new(
        host: Arc<dyn SpeechHost>,
        config: VoiceCoordinatorConfig,
    ) -> (Self, mpsc::UnboundedReceiver<VoiceEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let synthesis =
            SynthesisSessionManager::new(host.as_ref(), event_tx.clone()).with_timing(config.timing);
        let recognition = RecognitionSessionManager::new(host, event_tx.clone())
            .with_language(config.language.clone());

        let coordinator = Self {
            recognition,
            synthesis,
            config,
            event_tx,
        };
        (coordinator, event_rx)
    }

    pub const fn config(&self) -> &VoiceCoordinatorConfig {
        &self.config
    }

    pub const fn recognition(&self) -> &RecognitionSessionManager {
        &self.recognition
    }

    pub const fn synthesis(&self) -> &SynthesisSessionManager {
        &self.synthesis
    }

    pub const fn auto_speak(&self) -> bool {
        self.config.auto_speak
    }

    /// Bind host capabilities.
    pub fn initialize(&self) -> VoiceCapabilities {
        let capabilities = VoiceCapabilities {
            recognition: self.recognition.initialize(),
            synthesis: self.synthesis.is_supported(),
        };
        tracing::info!(
            recognition = capabilities.recognition,
            synthesis = capabilities.synthesis,
            "Voice capabilities"
        );
        capabilities
    }

    // ── Voice input ────────────────────────────────────────────────

    /// The microphone button: stop the running session, or check the
    /// microphone and capture one utterance.
    pub async fn toggle_listening(&self) -> VoiceInputOutcome {
        if !self.recognition.is_initialized() {
            return VoiceInputOutcome::Unsupported;
        }
        if self.recognition.is_listening() {
            self.recognition.stop_listening();
            return VoiceInputOutcome::Stopped;
        }

        // Keep our own playback out of the microphone.
        self.synthesis.stop();

        if let Err(e) = self.recognition.check_microphone().await {
            emit(&self.event_tx, VoiceEvent::RecognitionFailed(e.clone()));
            return VoiceInputOutcome::Failed(e);
        }

        let slot: Arc<Mutex<Option<VoiceInputOutcome>>> = Arc::new(Mutex::new(None));
        let on_result = {
            let slot = Arc::clone(&slot);
            move |text: String| store(&slot, VoiceInputOutcome::Transcript(text))
        };
        let on_error = {
            let slot = Arc::clone(&slot);
            move |err: VoiceError| store(&slot, VoiceInputOutcome::Failed(err))
        };

        let end = self.recognition.listen(on_result, on_error).await;
        let delivered = slot.lock().unwrap_or_else(PoisonError::into_inner).take();

        match (end, delivered) {
            (_, Some(outcome)) => outcome,
            (SessionEnd::Stopped, None) => VoiceInputOutcome::Stopped,
            (SessionEnd::Rejected, None) => VoiceInputOutcome::Busy,
            (SessionEnd::Resolved | SessionEnd::Failed | SessionEnd::Ended, None) => {
                VoiceInputOutcome::Ended
            }
        }
    }

    // ── Voice output ───────────────────────────────────────────────

    /// Speak a bot reply with the configured options and voice selection.
    pub async fn speak_reply(&self, text: &str) -> bool {
        self.synthesis
            .speak_with_preferred_voice(text, self.config.speak.clone())
            .await
    }

    pub fn stop_speaking(&self) {
        self.synthesis.stop();
    }
}

fn store(slot: &Mutex<Option<VoiceInputOutcome>>, outcome: VoiceInputOutcome) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
}
