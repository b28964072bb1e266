//! In-memory speech host for tests.
//!
//! Each fake records what the managers asked of it and exposes the sinks it
//! was handed, so a test can play the part of the platform: grant or refuse
//! the microphone, deliver recognition results, start and finish utterances,
//! load voices late.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::backend::{
    CaptureDevice, CaptureTrack, HostVoice, RecognitionBackend, RecognitionConfig,
    RecognitionEventSink, SpeechHost, SynthesisBackend, Utterance, UtteranceSink,
    VoicesChangedNotifier,
};
use crate::error::VoiceError;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Host ───────────────────────────────────────────────────────────

/// A host whose capabilities can be switched off one by one.
#[derive(Clone, Default)]
pub struct FakeSpeechHost {
    pub recognition: Option<Arc<FakeRecognition>>,
    pub synthesis: Option<Arc<FakeSynthesis>>,
    pub capture: Option<Arc<FakeCapture>>,
}

impl FakeSpeechHost {
    /// Every capability present, microphone granted, no voices loaded yet.
    pub fn new() -> Self {
        Self {
            recognition: Some(Arc::new(FakeRecognition::default())),
            synthesis: Some(Arc::new(FakeSynthesis::default())),
            capture: Some(Arc::new(FakeCapture::default())),
        }
    }

    /// No capability at all.
    pub fn unsupported() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn without_recognition(mut self) -> Self {
        self.recognition = None;
        self
    }

    #[must_use]
    pub fn without_synthesis(mut self) -> Self {
        self.synthesis = None;
        self
    }

    #[must_use]
    pub fn without_capture(mut self) -> Self {
        self.capture = None;
        self
    }

    /// The recognition fake. Panics if it was removed.
    pub fn rec(&self) -> &FakeRecognition {
        self.recognition.as_deref().expect("host has recognition")
    }

    /// The synthesis fake. Panics if it was removed.
    pub fn tts(&self) -> &FakeSynthesis {
        self.synthesis.as_deref().expect("host has synthesis")
    }

    /// The capture fake. Panics if it was removed.
    pub fn mic(&self) -> &FakeCapture {
        self.capture.as_deref().expect("host has capture")
    }
}

impl SpeechHost for FakeSpeechHost {
    fn recognition(&self) -> Option<Arc<dyn RecognitionBackend>> {
        self.recognition
            .clone()
            .map(|r| r as Arc<dyn RecognitionBackend>)
    }

    fn synthesis(&self) -> Option<Arc<dyn SynthesisBackend>> {
        self.synthesis.clone().map(|s| s as Arc<dyn SynthesisBackend>)
    }

    fn capture(&self) -> Option<Arc<dyn CaptureDevice>> {
        self.capture.clone().map(|c| c as Arc<dyn CaptureDevice>)
    }
}

// ── Recognition ────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeRecognition {
    sinks: Mutex<Vec<RecognitionEventSink>>,
    configs: Mutex<Vec<RecognitionConfig>>,
    refuse_start: AtomicBool,
    stops: AtomicUsize,
    aborts: AtomicUsize,
}

impl FakeRecognition {
    /// Make every following `start` fail.
    pub fn refuse_start(&self) {
        self.refuse_start.store(true, Ordering::SeqCst);
    }

    /// Sink of the most recently started session.
    pub fn sink(&self) -> RecognitionEventSink {
        lock(&self.sinks)
            .last()
            .cloned()
            .expect("a recognition session was started")
    }

    pub fn start_count(&self) -> usize {
        lock(&self.sinks).len()
    }

    pub fn last_config(&self) -> Option<RecognitionConfig> {
        lock(&self.configs).last().cloned()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }
}

impl RecognitionBackend for FakeRecognition {
    fn start(
        &self,
        config: &RecognitionConfig,
        sink: RecognitionEventSink,
    ) -> Result<(), VoiceError> {
        if self.refuse_start.load(Ordering::SeqCst) {
            return Err(VoiceError::StartFailed("InvalidStateError".to_string()));
        }
        lock(&self.configs).push(config.clone());
        lock(&self.sinks).push(sink);
        Ok(())
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn abort(&self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Synthesis ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeSynthesis {
    voices: Mutex<Vec<HostVoice>>,
    notifier: Mutex<Option<VoicesChangedNotifier>>,
    submitted: Mutex<Vec<(Utterance, UtteranceSink)>>,
    refuse_speak: AtomicBool,
    speaking: AtomicBool,
    pending: AtomicBool,
    cancels: AtomicUsize,
    ignored_cancels: AtomicUsize,
}

impl FakeSynthesis {
    /// Replace the voice list without notifying (picked up by polling).
    pub fn set_voices(&self, voices: Vec<HostVoice>) {
        *lock(&self.voices) = voices;
    }

    /// Replace the voice list and fire "voices changed".
    pub fn load_voices(&self, voices: Vec<HostVoice>) {
        self.set_voices(voices);
        if let Some(notifier) = lock(&self.notifier).as_ref() {
            notifier.notify();
        }
    }

    pub fn refuse_speak(&self) {
        self.refuse_speak.store(true, Ordering::SeqCst);
    }

    /// Pretend audio is (or is not) playing.
    pub fn set_speaking(&self, speaking: bool) {
        self.speaking.store(speaking, Ordering::SeqCst);
    }

    /// Pretend the host dropped its queue without telling anyone.
    pub fn drop_queue(&self) {
        self.pending.store(false, Ordering::SeqCst);
        self.speaking.store(false, Ordering::SeqCst);
    }

    pub fn submitted(&self) -> Vec<Utterance> {
        lock(&self.submitted).iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn last_utterance(&self) -> Option<Utterance> {
        lock(&self.submitted).last().map(|(u, _)| u.clone())
    }

    /// Sink of the most recently submitted utterance.
    pub fn sink(&self) -> UtteranceSink {
        lock(&self.submitted)
            .last()
            .map(|(_, s)| s.clone())
            .expect("an utterance was submitted")
    }

    /// Sink of the `index`-th submitted utterance.
    pub fn sink_at(&self, index: usize) -> UtteranceSink {
        lock(&self.submitted)[index].1.clone()
    }

    /// Keep playing through the next `n` cancels.
    pub fn ignore_cancels(&self, n: usize) {
        self.ignored_cancels.store(n, Ordering::SeqCst);
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn has_notifier(&self) -> bool {
        lock(&self.notifier).is_some()
    }
}

impl SynthesisBackend for FakeSynthesis {
    fn speak(&self, utterance: Utterance, sink: UtteranceSink) -> Result<(), VoiceError> {
        if self.refuse_speak.load(Ordering::SeqCst) {
            return Err(VoiceError::Synthesis("synthesis-failed".to_string()));
        }
        self.pending.store(true, Ordering::SeqCst);
        lock(&self.submitted).push((utterance, sink));
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        let ignored = self
            .ignored_cancels
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !ignored {
            self.drop_queue();
        }
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    fn voices(&self) -> Vec<HostVoice> {
        lock(&self.voices).clone()
    }

    fn set_voices_changed_notifier(&self, notifier: VoicesChangedNotifier) {
        *lock(&self.notifier) = Some(notifier);
    }
}

// ── Capture ────────────────────────────────────────────────────────

/// A microphone that counts how many of its tracks are still live.
pub struct FakeCapture {
    tracks_per_grant: usize,
    refuse_with: Mutex<Option<VoiceError>>,
    live: Arc<AtomicUsize>,
    grants: AtomicUsize,
}

impl Default for FakeCapture {
    fn default() -> Self {
        Self {
            tracks_per_grant: 2,
            refuse_with: Mutex::new(None),
            live: Arc::new(AtomicUsize::new(0)),
            grants: AtomicUsize::new(0),
        }
    }
}

impl FakeCapture {
    /// Fail every following acquisition with `err`.
    pub fn refuse(&self, err: VoiceError) {
        *lock(&self.refuse_with) = Some(err);
    }

    /// Tracks acquired and not yet stopped.
    pub fn live_tracks(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn grant_count(&self) -> usize {
        self.grants.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureDevice for FakeCapture {
    async fn acquire(&self) -> Result<Vec<Box<dyn CaptureTrack>>, VoiceError> {
        if let Some(err) = lock(&self.refuse_with).clone() {
            return Err(err);
        }
        self.grants.fetch_add(1, Ordering::SeqCst);
        Ok((0..self.tracks_per_grant)
            .map(|_| {
                self.live.fetch_add(1, Ordering::SeqCst);
                Box::new(FakeTrack {
                    live: Arc::clone(&self.live),
                    stopped: false,
                }) as Box<dyn CaptureTrack>
            })
            .collect())
    }
}

struct FakeTrack {
    live: Arc<AtomicUsize>,
    stopped: bool,
}

impl CaptureTrack for FakeTrack {
    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// A local voice for tests.
pub fn voice(name: &str, lang: &str, is_default: bool) -> HostVoice {
    HostVoice {
        id: name.to_lowercase().replace(' ', "-"),
        name: name.to_string(),
        lang: lang.to_string(),
        is_default,
        local_service: true,
    }
}
