//! Chat command handler.
//!
//! Interactive conversation loop. Typed lines go to the backend; slash
//! commands control the session and the voice coordinator. With
//! `--voice-input` every turn is captured through the speech host instead.

use anyhow::Result;
use mhc_core::{ChatSession, SubmitOutcome};
use mhc_voice::{VoiceCoordinator, VoiceEvent, VoiceInputOutcome};
use tokio::sync::mpsc;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{render_message, render_transcript};
use crate::utils::prompt;

const HELP: &str = "Commands: /voice speak one message, /stop silence playback, /clear start over, /quit exit";

/// Arguments for the chat command.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatArgs {
    pub speak: bool,
    pub voice_input: bool,
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Quit,
    Clear,
    Stop,
    Voice,
    Help,
    Message(String),
    Empty,
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "/quit" | "/exit" | "/q" => Self::Quit,
            "/clear" => Self::Clear,
            "/stop" => Self::Stop,
            "/voice" | "/mic" => Self::Voice,
            "/help" | "/?" => Self::Help,
            _ => Self::Message(trimmed.to_string()),
        }
    }
}

/// Execute the chat command.
pub async fn execute(ctx: &CliContext, args: ChatArgs) -> Result<()> {
    let session = ctx.chat_session();
    let (voice, events) = ctx.voice_coordinator(args.speak);
    let capabilities = voice.initialize();
    let event_log = tokio::spawn(report_voice_events(events));

    tracing::info!(
        endpoint = ctx.endpoint.as_str(),
        base_url = %ctx.api_base_url,
        auto_speak = voice.auto_speak(),
        "Chat started"
    );
    println!("{}", render_transcript(&session.messages()));
    println!("\n{HELP}");
    if args.voice_input && !capabilities.recognition {
        eprintln!("Voice input is not available; type your messages instead.");
    }
    let voice_turns = args.voice_input && capabilities.recognition;

    loop {
        let input = if voice_turns {
            match capture(&voice).await {
                Some(text) => ChatInput::parse(&text),
                None if ctx.input.is_closed() => ChatInput::Quit,
                None => ChatInput::Empty,
            }
        } else {
            prompt("\n> ").map_err(CliError::from)?;
            match ctx.input.next_line().await.map_err(CliError::from)? {
                Some(line) => ChatInput::parse(&line),
                None => ChatInput::Quit,
            }
        };

        match input {
            ChatInput::Quit => break,
            ChatInput::Empty => {}
            ChatInput::Help => println!("{HELP}"),
            ChatInput::Stop => voice.stop_speaking(),
            ChatInput::Clear => {
                voice.stop_speaking();
                session.clear();
                println!("{}", render_transcript(&session.messages()));
            }
            ChatInput::Voice => {
                if let Some(text) = capture(&voice).await {
                    send(&session, &voice, &text).await;
                }
            }
            ChatInput::Message(text) => send(&session, &voice, &text).await,
        }
    }

    voice.stop_speaking();
    event_log.abort();
    println!("Take care! 💚");
    Ok(())
}

/// One voice turn. `None` when nothing usable was heard.
async fn capture(voice: &VoiceCoordinator) -> Option<String> {
    match voice.toggle_listening().await {
        VoiceInputOutcome::Transcript(text) => Some(text),
        VoiceInputOutcome::Failed(e) => {
            eprintln!("🎤 {e}");
            None
        }
        VoiceInputOutcome::Unsupported => {
            eprintln!("🎤 Voice input is not available");
            None
        }
        VoiceInputOutcome::Stopped | VoiceInputOutcome::Busy | VoiceInputOutcome::Ended => None,
    }
}

async fn send(session: &ChatSession, voice: &VoiceCoordinator, text: &str) {
    let outcome = session.submit(text).await;
    if let Some(reply) = outcome.reply() {
        println!("{}", render_message(reply));
    }

    if let SubmitOutcome::Replied(reply) = &outcome {
        if voice.auto_speak() && reply.is_speakable() && !voice.speak_reply(&reply.text).await {
            tracing::warn!("Reply could not be spoken");
        }
    }
}

async fn report_voice_events(mut events: mpsc::UnboundedReceiver<VoiceEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            VoiceEvent::SpeechStalled(token) => {
                tracing::warn!(token = %token, "Speech never started");
                eprintln!("🔇 Speech didn't start. Use /stop and try again.");
            }
            VoiceEvent::SpeakingFailed { message, .. } => eprintln!("🔇 {message}"),
            VoiceEvent::VoicesLoading => tracing::info!("Waiting for voices to load"),
            other => tracing::debug!(event = ?other, "Voice event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ChatInput::parse("/quit"), ChatInput::Quit);
        assert_eq!(ChatInput::parse("  /EXIT "), ChatInput::Quit);
        assert_eq!(ChatInput::parse("/clear"), ChatInput::Clear);
        assert_eq!(ChatInput::parse("/stop"), ChatInput::Stop);
        assert_eq!(ChatInput::parse("/voice"), ChatInput::Voice);
        assert_eq!(ChatInput::parse("/help"), ChatInput::Help);
        assert_eq!(ChatInput::parse("   "), ChatInput::Empty);
    }

    #[test]
    fn test_parse_message_keeps_case() {
        assert_eq!(
            ChatInput::parse("  I am feeling Amazing today!  "),
            ChatInput::Message("I am feeling Amazing today!".to_string())
        );
        // Unknown slash words are ordinary text.
        assert_eq!(
            ChatInput::parse("/shrug"),
            ChatInput::Message("/shrug".to_string())
        );
    }
}
