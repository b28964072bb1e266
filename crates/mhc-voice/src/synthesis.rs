//! Synthesis session manager: owns the lifecycle of speech playback.
//!
//! Per utterance:
//!
//! ```text
//!   Queued → Speaking → Completed
//!      │         ├────→ Canceled
//!      └─────────┴────→ Errored
//! ```
//!
//! At most one utterance is active. A new request cancels the current one
//! before it is queued. A request still waiting for the host or the voice
//! list is pending: a newer request or a `stop` drops it before it plays.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::backend::{
    HostVoice, SpeechHost, SynthesisBackend, Utterance, UtteranceObserver, UtteranceSignal,
    UtteranceSink,
};
use crate::catalog::VoiceCatalog;
use crate::events::{EventSender, UtteranceState, VoiceEvent, emit};
use crate::session::{SessionToken, TokenIssuer};

/// Speech rate used when the caller gives none.
pub const DEFAULT_RATE: f32 = 0.9;

/// Pitch used when the caller gives none.
pub const DEFAULT_PITCH: f32 = 1.0;

/// Per-request playback options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeakOptions {
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
    /// Explicit voice. `None` lets the manager (or host) choose.
    pub voice: Option<HostVoice>,
}

/// Delays used by [`SynthesisSessionManager::speak_with_preferred_voice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisTiming {
    /// Pause after cancelling before checking whether the host went quiet.
    pub settle_delay: Duration,
    /// Pause after the second cancel when the host was still speaking.
    pub busy_retry_delay: Duration,
    /// Longest wait for the voice list.
    pub catalog_wait: Duration,
    /// How long a submitted utterance may take to start before it is
    /// reported as stalled.
    pub start_watchdog: Duration,
}

impl Default for SynthesisTiming {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(50),
            busy_retry_delay: Duration::from_millis(100),
            catalog_wait: Duration::from_millis(2000),
            start_watchdog: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveUtterance {
    token: SessionToken,
    state: UtteranceState,
}

/// State shared with the sinks handed to the backend.
struct SynthesisShared {
    current: Mutex<Option<ActiveUtterance>>,
    /// Request that has a token but has not been submitted yet.
    /// Lock order: `pending` before `current`.
    pending: Mutex<Option<SessionToken>>,
    events: EventSender,
}

impl SynthesisShared {
    fn lock(&self) -> MutexGuard<'_, Option<ActiveUtterance>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<SessionToken>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hold(&self, token: SessionToken) {
        *self.lock_pending() = Some(token);
    }

    /// Drop the pending request, if any.
    fn supersede_pending(&self) -> Option<SessionToken> {
        self.lock_pending().take()
    }

    fn is_pending(&self, token: SessionToken) -> bool {
        *self.lock_pending() == Some(token)
    }

    /// Move `token` from pending to queued. Fails when it was superseded.
    fn promote(&self, token: SessionToken) -> bool {
        let mut pending = self.lock_pending();
        if *pending != Some(token) {
            return false;
        }
        *pending = None;
        self.enqueue(token);
        true
    }

    fn state_of(&self, token: SessionToken) -> Option<UtteranceState> {
        self.lock()
            .filter(|active| active.token == token)
            .map(|active| active.state)
    }

    fn set(&self, active: &mut ActiveUtterance, state: UtteranceState) {
        tracing::debug!(token = %active.token, from = ?active.state, to = ?state, "Utterance state");
        active.state = state;
        emit(
            &self.events,
            VoiceEvent::UtteranceStateChanged {
                token: active.token,
                state,
            },
        );
    }

    /// Mark the active utterance canceled. Returns its token.
    fn cancel_active(&self) -> Option<SessionToken> {
        let mut current = self.lock();
        let active = current.as_mut().filter(|a| a.state.is_active())?;
        self.set(active, UtteranceState::Canceled);
        Some(active.token)
    }

    /// Make `token` the current utterance, in `Queued`.
    fn enqueue(&self, token: SessionToken) {
        let mut current = self.lock();
        let mut active = ActiveUtterance {
            token,
            state: UtteranceState::Queued,
        };
        self.set(&mut active, UtteranceState::Queued);
        *current = Some(active);
    }
}

impl UtteranceObserver for SynthesisShared {
    fn on_signal(&self, token: SessionToken, signal: UtteranceSignal) {
        let mut current = self.lock();
        let Some(active) = current.as_mut().filter(|a| a.token == token) else {
            tracing::debug!(token = %token, ?signal, "Discarding stale utterance event");
            return;
        };

        match (active.state, signal) {
            (UtteranceState::Queued, UtteranceSignal::Started) => {
                self.set(active, UtteranceState::Speaking);
                emit(&self.events, VoiceEvent::SpeakingStarted(token));
            }
            (UtteranceState::Queued | UtteranceState::Speaking, UtteranceSignal::Finished) => {
                self.set(active, UtteranceState::Completed);
                emit(&self.events, VoiceEvent::SpeakingFinished(token));
            }
            (UtteranceState::Queued | UtteranceState::Speaking, UtteranceSignal::Failed(message)) => {
                tracing::warn!(token = %token, error = %message, "Speech error");
                self.set(active, UtteranceState::Errored);
                emit(&self.events, VoiceEvent::SpeakingFailed { token, message });
            }
            (state, signal) => {
                tracing::debug!(token = %token, ?state, ?signal, "Ignoring utterance event");
            }
        }
    }
}

struct SynthesisBinding {
    backend: Arc<dyn SynthesisBackend>,
    catalog: VoiceCatalog,
}

/// Owns the single active utterance.
pub struct SynthesisSessionManager {
    binding: Option<SynthesisBinding>,
    shared: Arc<SynthesisShared>,
    tokens: TokenIssuer,
    timing: SynthesisTiming,
}

impl SynthesisSessionManager {
    /// Probe the host for synthesis. An unsupported host yields a manager
    /// whose every operation is a no-op.
    pub fn new(host: &dyn SpeechHost, events: mpsc::UnboundedSender<VoiceEvent>) -> Self {
        let binding = host.synthesis().map(|backend| SynthesisBinding {
            catalog: VoiceCatalog::new(Arc::clone(&backend)),
            backend,
        });
        if binding.is_none() {
            tracing::info!("Speech synthesis not supported");
        }
        Self {
            binding,
            shared: Arc::new(SynthesisShared {
                current: Mutex::new(None),
                pending: Mutex::new(None),
                events,
            }),
            tokens: TokenIssuer::new(),
            timing: SynthesisTiming::default(),
        }
    }

    #[must_use]
    pub const fn with_timing(mut self, timing: SynthesisTiming) -> Self {
        self.timing = timing;
        self
    }

    pub const fn is_supported(&self) -> bool {
        self.binding.is_some()
    }

    pub fn catalog(&self) -> Option<&VoiceCatalog> {
        self.binding.as_ref().map(|b| &b.catalog)
    }

    /// Token and state of the most recent utterance.
    pub fn current(&self) -> Option<(SessionToken, UtteranceState)> {
        self.shared.lock().map(|a| (a.token, a.state))
    }

    /// An utterance is queued or playing.
    pub fn is_active(&self) -> bool {
        self.current().is_some_and(|(_, state)| state.is_active())
    }

    // ── Speaking ───────────────────────────────────────────────────

    /// Cancel whatever is playing and queue `text`.
    ///
    /// Returns `false`, changing nothing, when synthesis is unsupported or
    /// the text is blank.
    pub fn speak(&self, text: &str, options: SpeakOptions) -> bool {
        let Some(binding) = &self.binding else {
            tracing::debug!("Speech synthesis not supported");
            return false;
        };
        if text.trim().is_empty() {
            tracing::debug!("No text to speak");
            return false;
        }

        let token = self.tokens.issue();
        if let Some(stale) = self.shared.supersede_pending() {
            tracing::debug!(token = %stale, "Dropping pending utterance");
        }
        self.shared.cancel_active();
        binding.backend.cancel();
        self.shared.enqueue(token);
        self.submit(&binding.backend, token, text, options)
    }

    /// [`speak`](Self::speak) with host settling and voice selection.
    ///
    /// Cancels, gives the host time to go quiet, waits (bounded) for the
    /// voice list, picks a preferred voice when `options` has none, submits,
    /// and arms a watchdog that reports an utterance the host never starts.
    ///
    /// Returns `false` without submitting when a newer request or a
    /// [`stop`](Self::stop) arrives while this one is still waiting.
    pub async fn speak_with_preferred_voice(&self, text: &str, options: SpeakOptions) -> bool {
        let Some(binding) = &self.binding else {
            tracing::debug!("Speech synthesis not supported");
            return false;
        };
        if text.trim().is_empty() {
            tracing::debug!("No text to speak");
            return false;
        }

        let token = self.tokens.issue();
        self.shared.hold(token);
        self.shared.cancel_active();
        binding.backend.cancel();
        tokio::time::sleep(self.timing.settle_delay).await;
        if !self.shared.is_pending(token) {
            return Self::superseded(token);
        }
        if binding.backend.is_speaking() {
            tracing::debug!("Speech synthesis busy, cancelling again");
            binding.backend.cancel();
            tokio::time::sleep(self.timing.busy_retry_delay).await;
            if !self.shared.is_pending(token) {
                return Self::superseded(token);
            }
        }

        let voice = match options.voice {
            Some(voice) => Some(voice),
            None => self.pick_voice(&binding.catalog).await,
        };
        let options = SpeakOptions { voice, ..options };

        if !self.shared.promote(token) {
            return Self::superseded(token);
        }
        if !self.submit(&binding.backend, token, text, options) {
            return false;
        }
        self.spawn_start_watchdog(token, Arc::clone(&binding.backend));
        true
    }

    fn superseded(token: SessionToken) -> bool {
        tracing::debug!(token = %token, "Speech request superseded before playback");
        false
    }

    async fn pick_voice(&self, catalog: &VoiceCatalog) -> Option<HostVoice> {
        let mut voices = catalog.snapshot();
        if voices.is_empty() {
            tracing::info!("Waiting for voices to load");
            emit(&self.shared.events, VoiceEvent::VoicesLoading);
            voices = catalog.wait_until_ready(self.timing.catalog_wait).await;
        }
        let voice = VoiceCatalog::preferred_voice(&voices);
        tracing::debug!(
            available = voices.len(),
            voice = voice.as_ref().map_or("host default", |v| v.name.as_str()),
            "Selected voice"
        );
        voice
    }

    /// Hand the already queued `token` to the backend.
    fn submit(
        &self,
        backend: &Arc<dyn SynthesisBackend>,
        token: SessionToken,
        text: &str,
        options: SpeakOptions,
    ) -> bool {
        let utterance = Utterance::new(
            token,
            text,
            options.rate.unwrap_or(DEFAULT_RATE),
            options.pitch.unwrap_or(DEFAULT_PITCH),
            options.voice,
        );
        tracing::info!(
            token = %token,
            chars = utterance.text.len(),
            rate = utterance.rate,
            pitch = utterance.pitch,
            "Starting speech synthesis"
        );
        let observer: Arc<dyn UtteranceObserver> = self.shared.clone();
        if let Err(e) = backend.speak(utterance, UtteranceSink::new(token, observer)) {
            self.shared.on_signal(token, UtteranceSignal::Failed(e.to_string()));
            return false;
        }
        true
    }

    fn spawn_start_watchdog(&self, token: SessionToken, backend: Arc<dyn SynthesisBackend>) {
        let shared = Arc::clone(&self.shared);
        let delay = self.timing.start_watchdog;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let queued = shared.state_of(token) == Some(UtteranceState::Queued);
            if queued && !backend.is_speaking() && !backend.is_pending() {
                tracing::warn!(token = %token, "Speech failed to start");
                emit(&shared.events, VoiceEvent::SpeechStalled(token));
            }
        });
    }

    /// Cancel the active utterance and drop any pending request. Idempotent.
    pub fn stop(&self) {
        let Some(binding) = &self.binding else {
            return;
        };
        if let Some(token) = self.shared.supersede_pending() {
            tracing::info!(token = %token, "Dropping pending speech");
        }
        if let Some(token) = self.shared.cancel_active() {
            tracing::info!(token = %token, "Stopping speech");
            binding.backend.cancel();
        }
    }
}
