//! Chat domain types.
//!
//! These types represent the companion conversation as the UI renders it,
//! independent of the wire shapes the backend speaks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Greeting shown before the user has said anything.
pub const WELCOME_TEXT: &str =
    "Hello! I'm here to listen and support you. How are you feeling today? 💚";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Overall sentiment of the user's message, as judged by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Parse either the short wire label (`pos`/`neg`/`neu`) or the long
    /// form (`positive`/`negative`/`neutral`).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pos" | "positive" => Some(Self::Positive),
            "neg" | "negative" => Some(Self::Negative),
            "neu" | "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Map an `/analyze` label, treating anything unrecognised as neutral.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Neutral)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }

    #[must_use]
    pub const fn emoji(&self) -> &'static str {
        match self {
            Self::Positive => "😊",
            Self::Negative => "😔",
            Self::Neutral => "😐",
        }
    }

    /// Hex colour used for the sentiment badge.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Positive => "#4ade80",
            Self::Negative => "#f87171",
            Self::Neutral => "#94a3b8",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary emotion detected in the user's message.
///
/// Labels the client has no styling for are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Emotion {
    Happy,
    Sad,
    Anxious,
    Frustrated,
    Excited,
    Worried,
    Neutral,
    Other(String),
}

/// Fallback colour for absent, unknown or zero-confidence emotions.
const MUTED_COLOR: &str = "#6b7280";

impl Emotion {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Self::Happy,
            "sad" => Self::Sad,
            "anxious" => Self::Anxious,
            "frustrated" => Self::Frustrated,
            "excited" => Self::Excited,
            "worried" => Self::Worried,
            "neutral" | "" => Self::Neutral,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Anxious => "anxious",
            Self::Frustrated => "frustrated",
            Self::Excited => "excited",
            Self::Worried => "worried",
            Self::Neutral => "neutral",
            Self::Other(label) => label,
        }
    }

    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Sad => "😢",
            Self::Anxious => "😰",
            Self::Frustrated => "😤",
            Self::Excited => "🤩",
            Self::Worried => "😟",
            Self::Neutral | Self::Other(_) => "😐",
        }
    }

    /// Badge colour; muted when the backend reported no confidence.
    #[must_use]
    pub fn color(&self, confidence: Option<f32>) -> &'static str {
        if confidence.is_none_or(|c| c <= 0.0) {
            return MUTED_COLOR;
        }
        match self {
            Self::Happy => "#4ade80",
            Self::Sad => "#60a5fa",
            Self::Anxious => "#fb923c",
            Self::Frustrated => "#f87171",
            Self::Excited => "#e879f9",
            Self::Worried => "#a78bfa",
            Self::Neutral | Self::Other(_) => MUTED_COLOR,
        }
    }
}

impl From<String> for Emotion {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Emotion> for String {
    fn from(e: Emotion) -> Self {
        e.as_str().to_string()
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a bot message came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    Gemini,
    Perplexity,
    Mock,
    /// Client-generated messages such as the welcome greeting.
    System,
    /// Locally generated replies standing in for a failed request.
    Error,
    Other(String),
}

impl Provider {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Self::Gemini,
            "perplexity" => Self::Perplexity,
            "mock" => Self::Mock,
            "system" => Self::System,
            "error" => Self::Error,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini => "gemini",
            Self::Perplexity => "perplexity",
            Self::Mock => "mock",
            Self::System => "system",
            Self::Error => "error",
            Self::Other(label) => label,
        }
    }

    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Gemini => "🧠",
            Self::Perplexity => "🔍",
            Self::Mock => "🎭",
            Self::System => "⚡",
            Self::Error => "⚠️",
            Self::Other(_) => "🤖",
        }
    }
}

impl From<String> for Provider {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Provider> for String {
    fn from(p: Provider) -> Self {
        p.as_str().to_string()
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic details the `/analyze` endpoint attaches to its reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisDebug {
    pub score: f64,
    pub pos_hits: Vec<String>,
    pub neg_hits: Vec<String>,
    pub emotion_scores: BTreeMap<String, f64>,
}

/// A bot reply normalised from either backend endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionReply {
    pub text: String,
    pub sentiment: Option<Sentiment>,
    pub emotion: Option<Emotion>,
    pub emotion_confidence: Option<f32>,
    pub emotion_breakdown: BTreeMap<String, f32>,
    pub provider: Option<Provider>,
    pub debug: Option<AnalysisDebug>,
}

/// A single entry in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sentiment: Option<Sentiment>,
    pub emotion: Option<Emotion>,
    pub emotion_confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub emotion_breakdown: BTreeMap<String, f32>,
    pub provider: Option<Provider>,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text: text.into(),
            timestamp: Utc::now(),
            sentiment: None,
            emotion: None,
            emotion_confidence: None,
            emotion_breakdown: BTreeMap::new(),
            provider: None,
        }
    }

    /// A message typed or dictated by the user. Surrounding whitespace is dropped.
    #[must_use]
    pub fn user(text: &str) -> Self {
        Self::new(Sender::User, text.trim())
    }

    /// The greeting every conversation starts with.
    #[must_use]
    pub fn welcome() -> Self {
        Self {
            sentiment: Some(Sentiment::Neutral),
            provider: Some(Provider::System),
            ..Self::new(Sender::Bot, WELCOME_TEXT)
        }
    }

    /// A bot message built from a backend reply.
    #[must_use]
    pub fn from_reply(reply: CompanionReply) -> Self {
        Self {
            sentiment: reply.sentiment,
            emotion: reply.emotion,
            emotion_confidence: reply.emotion_confidence,
            emotion_breakdown: reply.emotion_breakdown,
            provider: reply.provider,
            ..Self::new(Sender::Bot, reply.text)
        }
    }

    /// A locally generated bot message standing in for a failed request.
    #[must_use]
    pub fn error_reply(message: impl Into<String>) -> Self {
        Self {
            sentiment: Some(Sentiment::Neutral),
            provider: Some(Provider::Error),
            ..Self::new(Sender::Bot, message)
        }
    }

    #[must_use]
    pub const fn is_from_bot(&self) -> bool {
        matches!(self.sender, Sender::Bot)
    }

    /// Whether the message has any text worth reading aloud.
    #[must_use]
    pub fn is_speakable(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Emotion confidence as a whole percentage, for badges.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn confidence_percent(&self) -> Option<u8> {
        self.emotion_confidence
            .map(|c| (c.clamp(0.0, 1.0) * 100.0).round() as u8)
    }
}
