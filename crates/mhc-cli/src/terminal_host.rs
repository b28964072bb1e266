//! Speech host backed by the terminal.
//!
//! "Recognition" reads the next typed line as the spoken transcript and
//! "synthesis" prints the text it would say. This lets the voice pipeline run
//! end to end, with the same session rules and failure paths, on machines
//! without speech engines.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use mhc_voice::{
    CaptureDevice, CaptureTrack, HostVoice, RecognitionBackend, RecognitionConfig,
    RecognitionErrorCode, RecognitionEventSink, SpeechHost, SynthesisBackend, TranscriptSegment,
    Utterance, UtteranceSink, VoiceError,
};
use tokio::task::JoinHandle;

use crate::utils::LineSource;

const MIC_PROMPT: &str = "🎤 ";

/// Terminal implementation of [`SpeechHost`].
pub struct TerminalSpeechHost {
    recognition: Arc<TerminalRecognition>,
    synthesis: Arc<TerminalSynthesis>,
    capture: Arc<TerminalCapture>,
}

impl TerminalSpeechHost {
    pub fn new(input: LineSource) -> Self {
        Self {
            recognition: Arc::new(TerminalRecognition::new(input.clone())),
            synthesis: Arc::new(TerminalSynthesis),
            capture: Arc::new(TerminalCapture { input }),
        }
    }
}

impl SpeechHost for TerminalSpeechHost {
    fn recognition(&self) -> Option<Arc<dyn RecognitionBackend>> {
        Some(self.recognition.clone())
    }

    fn synthesis(&self) -> Option<Arc<dyn SynthesisBackend>> {
        Some(self.synthesis.clone())
    }

    fn capture(&self) -> Option<Arc<dyn CaptureDevice>> {
        Some(self.capture.clone())
    }
}

// ── Recognition ────────────────────────────────────────────────────

struct TerminalRecognition {
    input: LineSource,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TerminalRecognition {
    const fn new(input: LineSource) -> Self {
        Self {
            input,
            task: Mutex::new(None),
        }
    }

    fn take_task(&self) -> Option<JoinHandle<()>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

async fn read_utterance(input: LineSource, sink: RecognitionEventSink) {
    sink.started();
    if let Err(e) = crate::utils::prompt(MIC_PROMPT) {
        tracing::debug!(error = %e, "Could not show the microphone prompt");
    }

    match input.next_line().await {
        Ok(Some(line)) if !line.trim().is_empty() => {
            sink.result(0, vec![TranscriptSegment::final_text(line)]);
        }
        Ok(Some(_)) => sink.error(RecognitionErrorCode::NoSpeech),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Terminal read failed");
            sink.error(RecognitionErrorCode::AudioCapture);
        }
    }
    sink.ended();
}

impl RecognitionBackend for TerminalRecognition {
    fn start(
        &self,
        config: &RecognitionConfig,
        sink: RecognitionEventSink,
    ) -> Result<(), VoiceError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| VoiceError::StartFailed(e.to_string()))?;
        if self.input.is_closed() {
            return Err(VoiceError::StartFailed("input closed".to_string()));
        }

        tracing::debug!(token = %sink.token(), language = %config.language, "Reading one line as speech");
        let handle = runtime.spawn(read_utterance(self.input.clone(), sink));
        if let Some(previous) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle)
        {
            previous.abort();
        }
        Ok(())
    }

    fn stop(&self) {
        // A line is only final once it is complete; nothing to flush.
        self.abort();
    }

    fn abort(&self) {
        if let Some(task) = self.take_task() {
            task.abort();
        }
    }
}

// ── Synthesis ──────────────────────────────────────────────────────

struct TerminalSynthesis;

impl TerminalSynthesis {
    fn voice() -> HostVoice {
        HostVoice {
            id: "terminal".to_string(),
            name: "Terminal".to_string(),
            lang: "en-US".to_string(),
            is_default: true,
            local_service: true,
        }
    }
}

impl SynthesisBackend for TerminalSynthesis {
    fn speak(&self, utterance: Utterance, sink: UtteranceSink) -> Result<(), VoiceError> {
        sink.started();
        println!("🔊 {}", utterance.text);
        sink.finished();
        Ok(())
    }

    fn cancel(&self) {}

    fn is_speaking(&self) -> bool {
        false
    }

    fn is_pending(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<HostVoice> {
        vec![Self::voice()]
    }
}

// ── Capture ────────────────────────────────────────────────────────

struct TerminalCapture {
    input: LineSource,
}

struct KeyboardTrack;

impl CaptureTrack for KeyboardTrack {
    fn stop(&mut self) {}
}

#[async_trait]
impl CaptureDevice for TerminalCapture {
    async fn acquire(&self) -> Result<Vec<Box<dyn CaptureTrack>>, VoiceError> {
        if self.input.is_closed() {
            return Err(VoiceError::DeviceUnavailable);
        }
        Ok(vec![Box::new(KeyboardTrack)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mhc_voice::{
        RecognitionSessionManager, SessionEnd, SynthesisSessionManager, UtteranceState, VoiceEvent,
    };
    use std::io::Cursor;
    use tokio::sync::mpsc;

    fn host(input: &'static [u8]) -> Arc<TerminalSpeechHost> {
        Arc::new(TerminalSpeechHost::new(LineSource::from_reader(Cursor::new(
            input,
        ))))
    }

    fn recognition(
        host: Arc<TerminalSpeechHost>,
    ) -> (RecognitionSessionManager, mpsc::UnboundedReceiver<VoiceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let manager = RecognitionSessionManager::new(host, tx);
        assert!(manager.initialize());
        (manager, rx)
    }

    #[tokio::test]
    async fn test_typed_line_is_the_transcript() {
        let (manager, _rx) = recognition(host(b"  I am feeling amazing today!  \n"));

        let heard = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&heard);
        let end = manager
            .listen(
                move |text| *sink.lock().unwrap() = Some(text),
                |e| panic!("unexpected error: {e}"),
            )
            .await;

        assert_eq!(end, SessionEnd::Resolved);
        assert_eq!(
            heard.lock().unwrap().as_deref(),
            Some("I am feeling amazing today!")
        );
    }

    #[tokio::test]
    async fn test_blank_line_is_no_speech() {
        let (manager, _rx) = recognition(host(b"   \n"));

        let failure = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&failure);
        let end = manager
            .listen(|_| panic!("no transcript expected"), move |e| {
                *sink.lock().unwrap() = Some(e);
            })
            .await;

        assert_eq!(end, SessionEnd::Failed);
        assert_eq!(*failure.lock().unwrap(), Some(VoiceError::NoSpeech));
    }

    #[tokio::test]
    async fn test_end_of_input_ends_silently_and_closes_the_mic() {
        let host = host(b"");
        let (manager, _rx) = recognition(Arc::clone(&host));

        let end = manager
            .listen(|_| panic!("no transcript"), |e| panic!("no error: {e}"))
            .await;
        assert_eq!(end, SessionEnd::Ended);

        assert_eq!(
            manager.check_microphone().await,
            Err(VoiceError::DeviceUnavailable)
        );
        assert!(!manager.start_listening(|_| {}, |_| {}).await);
    }

    #[tokio::test]
    async fn test_microphone_check_passes_while_input_is_open() {
        let (manager, _rx) = recognition(host(b"hello\n"));
        assert!(manager.test_microphone().await);
    }

    #[tokio::test]
    async fn test_synthesis_completes_immediately() {
        let host = host(b"");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let manager = SynthesisSessionManager::new(host.as_ref(), tx);

        assert!(manager.is_supported());
        assert!(manager.speak("Love that energy!", Default::default()));
        assert!(matches!(
            manager.current(),
            Some((_, UtteranceState::Completed))
        ));

        let mut saw_finish = false;
        while let Ok(event) = rx.try_recv() {
            saw_finish |= matches!(event, VoiceEvent::SpeakingFinished(_));
        }
        assert!(saw_finish);
    }

    #[test]
    fn test_single_default_voice() {
        let voices = TerminalSynthesis.voices();
        assert_eq!(voices.len(), 1);
        assert!(voices[0].is_default);
        assert_eq!(voices[0].lang, "en-US");
    }
}
