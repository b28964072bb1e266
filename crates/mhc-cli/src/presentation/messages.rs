//! Chat message rendering.

use std::fmt::Write;

use chrono::Local;
use mhc_core::{ChatMessage, Emotion};

const BOT_NAME: &str = "Companion";
const USER_NAME: &str = "You";

/// Header line plus indented text for one message.
///
/// Bot messages carry their provider icon and, when the backend classified
/// the message, the sentiment and emotion badges. A missing emotion renders
/// as neutral.
pub fn render_message(message: &ChatMessage) -> String {
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    let mut out = format!("[{time}] ");

    if message.is_from_bot() {
        if let Some(provider) = &message.provider {
            let _ = write!(out, "{} ", provider.icon());
        }
        out.push_str(BOT_NAME);

        if let Some(sentiment) = message.sentiment {
            let _ = write!(out, " · {} {sentiment}", sentiment.emoji());
        }
        if message.sentiment.is_some() || message.emotion.is_some() {
            let emotion = message.emotion.clone().unwrap_or(Emotion::Neutral);
            let _ = write!(out, " · {} {emotion}", emotion.icon());
            if let Some(percent) = message.confidence_percent() {
                let _ = write!(out, " {percent}%");
            }
        }
    } else {
        out.push_str(USER_NAME);
    }

    for line in message.text.lines() {
        let _ = write!(out, "\n  {line}");
    }
    out
}

/// Every message, separated by blank lines.
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(render_message)
        .collect::<Vec<_>>()
        .join("\n\n")
}
