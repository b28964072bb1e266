//! Voice catalog: the host's synthesis voices, which may arrive late.
//!
//! Some hosts report an empty list until they have loaded their voices and
//! then fire a "voices changed" notification. Callers that need a voice
//! wait for whichever comes first: the notification or the next poll.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::backend::{HostVoice, SynthesisBackend, VoicesChangedNotifier};

/// How often the catalog re-queries the host while waiting.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Name markers of the higher-quality vendor voices.
const VENDOR_MARKERS: [&str; 2] = ["Google", "Microsoft"];

/// Process-wide view of the host's voice list.
#[derive(Clone)]
pub struct VoiceCatalog {
    backend: Arc<dyn SynthesisBackend>,
    changed: Arc<watch::Sender<u64>>,
}

impl VoiceCatalog {
    /// Bind to a backend and subscribe to its voice-list notifications.
    pub fn new(backend: Arc<dyn SynthesisBackend>) -> Self {
        let (tx, _rx) = watch::channel(0_u64);
        let changed = Arc::new(tx);
        backend.set_voices_changed_notifier(VoicesChangedNotifier::new(Arc::clone(&changed)));
        Self { backend, changed }
    }

    /// Voices the host knows right now.
    pub fn snapshot(&self) -> Vec<HostVoice> {
        self.backend.voices()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Wait until the host reports at least one voice.
    ///
    /// Returns immediately when voices are already known. Otherwise wakes on
    /// every notification and every [`POLL_INTERVAL`], and gives up at
    /// `timeout` with an empty list. Never waits past `timeout`.
    pub async fn wait_until_ready(&self, timeout: Duration) -> Vec<HostVoice> {
        let mut changed = self.changed.subscribe();
        let deadline = Instant::now() + timeout;

        loop {
            let voices = self.snapshot();
            if !voices.is_empty() {
                return voices;
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::debug!(timeout_ms = timeout.as_millis(), "No voices loaded before timeout");
                return voices;
            }

            let wake = (now + POLL_INTERVAL).min(deadline);
            tokio::select! {
                _ = changed.changed() => {}
                () = tokio::time::sleep_until(wake) => {}
            }
        }
    }

    /// The voice to use when the caller did not choose one.
    ///
    /// In order: an English vendor voice, an English default voice, the
    /// host's default voice, the first voice.
    pub fn preferred_voice(voices: &[HostVoice]) -> Option<HostVoice> {
        let english = |v: &&HostVoice| v.lang.to_ascii_lowercase().starts_with("en");

        voices
            .iter()
            .filter(english)
            .find(|v| VENDOR_MARKERS.iter().any(|m| v.name.contains(m)))
            .or_else(|| voices.iter().filter(english).find(|v| v.is_default))
            .or_else(|| voices.iter().find(|v| v.is_default))
            .or_else(|| voices.first())
            .cloned()
    }
}
