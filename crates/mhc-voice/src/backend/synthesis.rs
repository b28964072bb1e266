use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::VoiceError;
use crate::session::SessionToken;

/// A synthesis voice offered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostVoice {
    pub id: String,
    pub name: String,
    /// BCP 47 language tag, e.g. `en-GB`.
    pub lang: String,
    pub is_default: bool,
    pub local_service: bool,
}

/// A request to speak one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: SessionToken,
    pub text: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// `None` lets the host pick its default voice.
    pub voice: Option<HostVoice>,
}

impl Utterance {
    pub const MIN_RATE: f32 = 0.1;
    pub const MAX_RATE: f32 = 10.0;
    pub const MIN_PITCH: f32 = 0.0;
    pub const MAX_PITCH: f32 = 2.0;

    pub(crate) fn new(
        id: SessionToken,
        text: &str,
        rate: f32,
        pitch: f32,
        voice: Option<HostVoice>,
    ) -> Self {
        Self {
            id,
            text: text.to_string(),
            rate: bounded(rate, Self::MIN_RATE, Self::MAX_RATE, 1.0),
            pitch: bounded(pitch, Self::MIN_PITCH, Self::MAX_PITCH, 1.0),
            volume: 1.0,
            voice,
        }
    }
}

fn bounded(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UtteranceSignal {
    Started,
    Finished,
    Failed(String),
}

pub(crate) trait UtteranceObserver: Send + Sync {
    fn on_signal(&self, token: SessionToken, signal: UtteranceSignal);
}

/// Where a backend reports the progress of one utterance.
#[derive(Clone)]
pub struct UtteranceSink {
    token: SessionToken,
    observer: Arc<dyn UtteranceObserver>,
}

impl std::fmt::Debug for UtteranceSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtteranceSink")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl UtteranceSink {
    pub(crate) fn new(token: SessionToken, observer: Arc<dyn UtteranceObserver>) -> Self {
        Self { token, observer }
    }

    pub const fn token(&self) -> SessionToken {
        self.token
    }

    /// Audio output began.
    pub fn started(&self) {
        self.observer.on_signal(self.token, UtteranceSignal::Started);
    }

    /// The utterance played to the end.
    pub fn finished(&self) {
        self.observer.on_signal(self.token, UtteranceSignal::Finished);
    }

    /// The host could not play the utterance.
    pub fn failed(&self, reason: impl Into<String>) {
        self.observer
            .on_signal(self.token, UtteranceSignal::Failed(reason.into()));
    }
}

/// Handle a backend uses to announce that its voice list changed.
#[derive(Debug, Clone)]
pub struct VoicesChangedNotifier {
    tx: Arc<watch::Sender<u64>>,
}

impl VoicesChangedNotifier {
    pub(crate) const fn new(tx: Arc<watch::Sender<u64>>) -> Self {
        Self { tx }
    }

    pub fn notify(&self) {
        self.tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    }
}

/// Host text-to-speech.
pub trait SynthesisBackend: Send + Sync {
    /// Queue an utterance. Progress is reported through `sink`.
    fn speak(&self, utterance: Utterance, sink: UtteranceSink) -> Result<(), VoiceError>;

    /// Drop the current and every queued utterance.
    fn cancel(&self);

    /// Audio is playing right now.
    fn is_speaking(&self) -> bool;

    /// Utterances are queued but not yet playing.
    fn is_pending(&self) -> bool;

    /// Voices currently known. May be empty until the host has loaded them.
    fn voices(&self) -> Vec<HostVoice>;

    /// Register for voice-list change notifications. Hosts without such
    /// notifications can ignore this; the catalog also polls.
    fn set_voices_changed_notifier(&self, notifier: VoicesChangedNotifier) {
        let _ = notifier;
    }
}
