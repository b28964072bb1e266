//! End-to-end flows through the `VoiceCoordinator` façade: the microphone
//! button, spoken replies and the interaction between the two.

use std::sync::Arc;
use std::time::Duration;

use mhc_core::FailureKind;
use mhc_voice::testing::FakeSpeechHost;
use mhc_voice::{
    RecognitionErrorCode, SpeakOptions, TranscriptSegment, UtteranceState, VoiceCapabilities,
    VoiceCoordinator, VoiceCoordinatorConfig, VoiceError, VoiceEvent, VoiceInputOutcome,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_test::task;
use tokio_test::{assert_pending, assert_ready_eq};

fn coordinator(host: &FakeSpeechHost) -> (VoiceCoordinator, mpsc::UnboundedReceiver<VoiceEvent>) {
    let (coordinator, rx) =
        VoiceCoordinator::new(Arc::new(host.clone()), VoiceCoordinatorConfig::default());
    coordinator.initialize();
    (coordinator, rx)
}

fn drain_events(rx: &mut mpsc::UnboundedReceiver<VoiceEvent>) -> Vec<VoiceEvent> {
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    events
}

// ── Capabilities ───────────────────────────────────────────────────

#[test]
fn capabilities_reflect_the_host() {
    let (full, _rx) = VoiceCoordinator::new(
        Arc::new(FakeSpeechHost::new()),
        VoiceCoordinatorConfig::default(),
    );
    assert_eq!(
        full.initialize(),
        VoiceCapabilities {
            recognition: true,
            synthesis: true,
        }
    );

    let (bare, _rx) = VoiceCoordinator::new(
        Arc::new(FakeSpeechHost::unsupported()),
        VoiceCoordinatorConfig::default(),
    );
    assert_eq!(
        bare.initialize(),
        VoiceCapabilities {
            recognition: false,
            synthesis: false,
        }
    );
}

#[test]
fn listening_without_recognition_is_unsupported() {
    let host = FakeSpeechHost::new().without_recognition();
    let (coordinator, _rx) = coordinator(&host);

    let mut fut = task::spawn(coordinator.toggle_listening());
    assert_ready_eq!(fut.poll(), VoiceInputOutcome::Unsupported);
}

// ── Voice input ────────────────────────────────────────────────────

#[test]
fn spoken_message_becomes_transcript() {
    let host = FakeSpeechHost::new();
    let (coordinator, _rx) = coordinator(&host);

    let mut fut = task::spawn(coordinator.toggle_listening());
    assert_pending!(fut.poll());
    assert_eq!(host.mic().grant_count(), 1);
    assert_eq!(host.mic().live_tracks(), 0, "microphone check releases its tracks");

    let sink = host.rec().sink();
    sink.started();
    sink.result(0, vec![TranscriptSegment::interim("I am feeling")]);
    sink.result(
        0,
        vec![TranscriptSegment::final_text("I am feeling amazing today!")],
    );
    assert_ready_eq!(
        fut.poll(),
        VoiceInputOutcome::Transcript("I am feeling amazing today!".to_string())
    );
}

#[test]
fn second_press_stops_the_session() {
    let host = FakeSpeechHost::new();
    let (coordinator, _rx) = coordinator(&host);

    let mut first = task::spawn(coordinator.toggle_listening());
    assert_pending!(first.poll());
    host.rec().sink().started();
    assert_pending!(first.poll());

    let mut second = task::spawn(coordinator.toggle_listening());
    assert_ready_eq!(second.poll(), VoiceInputOutcome::Stopped);
    assert_ready_eq!(first.poll(), VoiceInputOutcome::Stopped);
    assert_eq!(host.rec().abort_count(), 1);
}

#[test]
fn refused_microphone_never_starts_recognition() {
    let host = FakeSpeechHost::new();
    host.mic().refuse(VoiceError::PermissionDenied);
    let (coordinator, mut rx) = coordinator(&host);

    let mut fut = task::spawn(coordinator.toggle_listening());
    assert_ready_eq!(
        fut.poll(),
        VoiceInputOutcome::Failed(VoiceError::PermissionDenied)
    );
    assert_eq!(host.rec().start_count(), 0);
    assert!(
        drain_events(&mut rx).contains(&VoiceEvent::RecognitionFailed(VoiceError::PermissionDenied))
    );
}

#[test]
fn recognition_error_is_a_typed_failure() {
    let host = FakeSpeechHost::new();
    let (coordinator, _rx) = coordinator(&host);

    let mut fut = task::spawn(coordinator.toggle_listening());
    assert_pending!(fut.poll());
    host.rec().sink().error(RecognitionErrorCode::NoSpeech);

    assert_ready_eq!(fut.poll(), VoiceInputOutcome::Failed(VoiceError::NoSpeech));
    assert_eq!(VoiceError::NoSpeech.kind(), FailureKind::Timeout);
}

#[test]
fn host_ending_silently_is_reported_as_ended() {
    let host = FakeSpeechHost::new();
    let (coordinator, _rx) = coordinator(&host);

    let mut fut = task::spawn(coordinator.toggle_listening());
    assert_pending!(fut.poll());
    host.rec().sink().ended();
    assert_ready_eq!(fut.poll(), VoiceInputOutcome::Ended);
}

#[test]
fn pressing_the_mic_silences_playback() {
    let host = FakeSpeechHost::new();
    let (coordinator, _rx) = coordinator(&host);

    assert!(coordinator.synthesis().speak("a long reply", SpeakOptions::default()));
    host.tts().sink().started();

    let mut fut = task::spawn(coordinator.toggle_listening());
    assert_pending!(fut.poll());
    assert_eq!(
        coordinator.synthesis().current().map(|(_, state)| state),
        Some(UtteranceState::Canceled)
    );
}

#[tokio::test(start_paused = true)]
async fn pressing_the_mic_drops_a_reply_still_waiting_for_voices() {
    let host = FakeSpeechHost::new();
    let (coordinator, _rx) = coordinator(&host);

    let press_mic = async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let mut listen = task::spawn(coordinator.toggle_listening());
        assert_pending!(listen.poll());
        assert_eq!(host.mic().grant_count(), 1);
    };
    let (spoke, ()) = tokio::join!(coordinator.speak_reply("a long reply"), press_mic);

    assert!(!spoke);
    assert!(host.tts().submitted().is_empty());
    assert!(!coordinator.synthesis().is_active());
}

// ── Voice output ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn reply_is_spoken_even_before_voices_load() {
    let host = FakeSpeechHost::new();
    let (coordinator, _rx) = coordinator(&host);

    let start = Instant::now();
    assert!(coordinator.speak_reply("I am feeling amazing today!").await);
    assert!(start.elapsed() <= Duration::from_millis(2100));

    let utterance = host.tts().last_utterance().unwrap();
    assert!((utterance.rate - 0.9).abs() < f32::EPSILON);
    assert!(coordinator.synthesis().is_active());

    coordinator.stop_speaking();
    assert!(!coordinator.synthesis().is_active());
}

#[tokio::test(start_paused = true)]
async fn reply_without_synthesis_is_declined() {
    let host = FakeSpeechHost::new().without_synthesis();
    let (coordinator, _rx) = coordinator(&host);

    assert!(!coordinator.speak_reply("hello").await);
    coordinator.stop_speaking();
}
