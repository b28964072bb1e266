//! Recognition session manager: owns the lifecycle of one speech-capture
//! session.
//!
//! ```text
//!   Idle → AwaitingPermission → Listening → Resolved
//!                │                  │
//!                ├──────────────────┴──────→ Failed
//!                └──── stop / host ended ──→ Idle
//! ```
//!
//! At most one session is in flight. Host events arrive on a single channel
//! tagged with the session token; anything tagged with a token other than
//! the one being awaited is stale and dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::backend::{
    RecognitionBackend, RecognitionConfig, RecognitionEvent, RecognitionEventSink,
    RecognitionSignal, SpeechHost, TaggedRecognitionEvent,
};
use crate::capture::CaptureGrant;
use crate::error::VoiceError;
use crate::events::{EventSender, RecognitionState, VoiceEvent, emit};
use crate::session::{SessionToken, TokenIssuer};

/// How a listening session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// A final transcript was delivered to `on_result`.
    Resolved,
    /// An error was delivered to `on_error`.
    Failed,
    /// The host ended the session without a result.
    Ended,
    /// `stop_listening` was called.
    Stopped,
    /// Not initialized, or another session was already active.
    Rejected,
}

#[derive(Default)]
struct RecognitionInner {
    backend: Option<Arc<dyn RecognitionBackend>>,
    state: RecognitionState,
    active: Option<SessionToken>,
    final_transcript: String,
    interim_transcript: String,
}

enum Step {
    Continue,
    Resolved(String),
    Failed(VoiceError),
    Ended,
}

/// Owns at most one recognition session at a time.
pub struct RecognitionSessionManager {
    host: Arc<dyn SpeechHost>,
    config: RecognitionConfig,
    inner: Mutex<RecognitionInner>,
    tokens: TokenIssuer,
    signal_tx: mpsc::UnboundedSender<TaggedRecognitionEvent>,
    signal_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<TaggedRecognitionEvent>>,
    events: EventSender,
}

/// Aborts the session if the listening future is dropped before it ends.
struct SessionGuard<'a> {
    manager: &'a RecognitionSessionManager,
    token: SessionToken,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        let backend = {
            let mut inner = self.manager.lock();
            if inner.active != Some(self.token) {
                return;
            }
            inner.active = None;
            inner.interim_transcript.clear();
            self.manager.set_state(&mut inner, RecognitionState::Idle);
            inner.backend.clone()
        };
        tracing::debug!(token = %self.token, "Listening future dropped, aborting session");
        if let Some(backend) = backend {
            backend.abort();
        }
    }
}

impl RecognitionSessionManager {
    pub fn new(host: Arc<dyn SpeechHost>, events: mpsc::UnboundedSender<VoiceEvent>) -> Self {
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        Self {
            host,
            config: RecognitionConfig::default(),
            inner: Mutex::new(RecognitionInner::default()),
            tokens: TokenIssuer::new(),
            signal_tx,
            signal_rx: tokio::sync::Mutex::new(signal_rx),
            events,
        }
    }

    /// Recognise a language other than `en-US`.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    fn lock(&self) -> MutexGuard<'_, RecognitionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, inner: &mut RecognitionInner, state: RecognitionState) {
        if inner.state != state {
            tracing::debug!(from = ?inner.state, to = ?state, "Recognition state");
            inner.state = state;
            emit(&self.events, VoiceEvent::RecognitionStateChanged(state));
        }
    }

    // ── Queries ────────────────────────────────────────────────────

    pub const fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    pub fn state(&self) -> RecognitionState {
        self.lock().state
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().backend.is_some()
    }

    /// A session is awaiting permission or capturing.
    pub fn is_listening(&self) -> bool {
        self.lock().state.is_active()
    }

    /// The latest partial hypothesis of the current session.
    pub fn interim_transcript(&self) -> String {
        self.lock().interim_transcript.clone()
    }

    /// Final text accumulated by the current or last session.
    pub fn final_transcript(&self) -> String {
        self.lock().final_transcript.clone()
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Probe the host and bind its recognition backend.
    ///
    /// Returns `false`, changing nothing, when the host has no recognition.
    pub fn initialize(&self) -> bool {
        let mut inner = self.lock();
        if inner.backend.is_some() {
            return true;
        }
        let Some(backend) = self.host.recognition() else {
            tracing::info!("Speech recognition not supported");
            return false;
        };
        inner.backend = Some(backend);
        tracing::info!(
            language = %self.config.language,
            interim = self.config.interim_results,
            "Voice input initialized"
        );
        true
    }

    /// Run one session to completion.
    ///
    /// Resolves `true` only when `on_result` was called with a final
    /// transcript. Neither callback is called when the manager is not
    /// initialized, a session is already active, the session is stopped, or
    /// the host ends it without a result.
    pub async fn start_listening<R, E>(&self, on_result: R, on_error: E) -> bool
    where
        R: FnOnce(String) + Send,
        E: FnOnce(VoiceError) + Send,
    {
        self.listen(on_result, on_error).await == SessionEnd::Resolved
    }

    /// Like [`start_listening`](Self::start_listening), but reports how the
    /// session ended.
    pub async fn listen<R, E>(&self, on_result: R, on_error: E) -> SessionEnd
    where
        R: FnOnce(String) + Send,
        E: FnOnce(VoiceError) + Send,
    {
        let (token, backend) = {
            let mut inner = self.lock();
            let Some(backend) = inner.backend.clone() else {
                tracing::warn!("Recognition not initialized");
                return SessionEnd::Rejected;
            };
            if inner.state.is_active() {
                tracing::debug!("Already listening");
                return SessionEnd::Rejected;
            }
            let token = self.tokens.issue();
            inner.active = Some(token);
            inner.final_transcript.clear();
            inner.interim_transcript.clear();
            self.set_state(&mut inner, RecognitionState::AwaitingPermission);
            (token, backend)
        };
        let _guard = SessionGuard {
            manager: self,
            token,
        };

        tracing::info!(token = %token, "Starting voice recognition");
        let sink = RecognitionEventSink::new(token, self.signal_tx.clone());
        if let Err(e) = backend.start(&self.config, sink) {
            tracing::warn!(token = %token, error = %e, "Failed to start voice recognition");
            let err = VoiceError::StartFailed(e.to_string());
            {
                let mut inner = self.lock();
                inner.active = None;
                self.set_state(&mut inner, RecognitionState::Failed);
                emit(&self.events, VoiceEvent::RecognitionFailed(err.clone()));
            }
            on_error(err);
            return SessionEnd::Failed;
        }

        let mut rx = self.signal_rx.lock().await;
        while let Some(TaggedRecognitionEvent {
            token: event_token,
            signal,
        }) = rx.recv().await
        {
            if event_token != token {
                tracing::debug!(stale = %event_token, current = %token, "Discarding stale recognition event");
                continue;
            }
            let event = match signal {
                RecognitionSignal::Stopped => return SessionEnd::Stopped,
                RecognitionSignal::Host(event) => event,
            };
            match self.apply(token, event) {
                Step::Continue => {}
                Step::Resolved(text) => {
                    backend.stop();
                    on_result(text);
                    return SessionEnd::Resolved;
                }
                Step::Failed(err) => {
                    on_error(err);
                    return SessionEnd::Failed;
                }
                Step::Ended => return SessionEnd::Ended,
            }
        }
        SessionEnd::Ended
    }

    fn apply(&self, token: SessionToken, event: RecognitionEvent) -> Step {
        let mut inner = self.lock();
        if inner.active != Some(token) {
            // Stopped while this event sat in the queue.
            return Step::Continue;
        }

        match event {
            RecognitionEvent::Started => {
                if inner.state == RecognitionState::AwaitingPermission {
                    tracing::debug!(token = %token, "Voice recognition started");
                    self.set_state(&mut inner, RecognitionState::Listening);
                }
                Step::Continue
            }
            RecognitionEvent::Result {
                result_index,
                results,
            } => {
                let mut final_chunk = String::new();
                let mut interim = String::new();
                for segment in results.iter().skip(result_index) {
                    if segment.is_final {
                        final_chunk.push_str(&segment.text);
                    } else {
                        interim.push_str(&segment.text);
                    }
                }
                inner.final_transcript.push_str(&final_chunk);

                if !final_chunk.trim().is_empty() {
                    let text = inner.final_transcript.trim().to_string();
                    tracing::info!(token = %token, chars = text.len(), "Final transcript");
                    inner.active = None;
                    inner.interim_transcript.clear();
                    self.set_state(&mut inner, RecognitionState::Resolved);
                    emit(&self.events, VoiceEvent::FinalTranscript(text.clone()));
                    return Step::Resolved(text);
                }

                if !interim.is_empty() {
                    tracing::trace!(token = %token, interim = %interim, "Interim transcript");
                    inner.interim_transcript.clone_from(&interim);
                    emit(&self.events, VoiceEvent::InterimTranscript(interim));
                }
                Step::Continue
            }
            RecognitionEvent::Error(code) => {
                tracing::warn!(token = %token, code = code.as_code(), "Voice recognition error");
                let err = VoiceError::from(code);
                inner.active = None;
                inner.interim_transcript.clear();
                self.set_state(&mut inner, RecognitionState::Failed);
                emit(&self.events, VoiceEvent::RecognitionFailed(err.clone()));
                Step::Failed(err)
            }
            RecognitionEvent::Ended => {
                tracing::debug!(token = %token, "Voice recognition ended without a result");
                inner.active = None;
                inner.interim_transcript.clear();
                self.set_state(&mut inner, RecognitionState::Idle);
                Step::Ended
            }
        }
    }

    /// Cancel the active session.
    ///
    /// The pending [`start_listening`](Self::start_listening) future resolves
    /// `false` without calling either callback. Returns `false` when there
    /// was nothing to stop.
    pub fn stop_listening(&self) -> bool {
        let (token, backend) = {
            let mut inner = self.lock();
            if !inner.state.is_active() {
                return false;
            }
            let Some(token) = inner.active.take() else {
                return false;
            };
            inner.interim_transcript.clear();
            self.set_state(&mut inner, RecognitionState::Idle);
            (token, inner.backend.clone())
        };

        tracing::info!(token = %token, "Stopping voice recognition");
        let _ = self.signal_tx.send(TaggedRecognitionEvent {
            token,
            signal: RecognitionSignal::Stopped,
        });
        if let Some(backend) = backend {
            backend.abort();
        }
        true
    }

    // ── Microphone checks ──────────────────────────────────────────

    /// Verify microphone permission and device availability.
    ///
    /// The grant is released before this returns, on every path.
    pub async fn check_microphone(&self) -> Result<(), VoiceError> {
        let device = self.host.capture().ok_or(VoiceError::CaptureUnavailable)?;
        let grant = CaptureGrant::acquire(device.as_ref()).await?;
        grant.release();
        tracing::info!("Microphone access granted");
        Ok(())
    }

    /// [`check_microphone`](Self::check_microphone) as a yes/no answer.
    pub async fn test_microphone(&self) -> bool {
        match self.check_microphone().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Microphone test failed");
                false
            }
        }
    }
}
