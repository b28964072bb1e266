//! Domain types for the companion client.

mod chat;
mod failure;

pub use chat::{
    AnalysisDebug, ChatMessage, CompanionReply, Emotion, Provider, Sender, Sentiment,
    WELCOME_TEXT,
};
pub use failure::FailureKind;
