//! Chat session - the conversation the UI renders.
//!
//! Holds the message list, sends user input to the companion backend and
//! turns every outcome (reply or failure) into a bot message. At most one
//! request is in flight; input submitted meanwhile is ignored.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::ChatMessage;
use crate::ports::{ApiError, ChatEndpoint, CompanionApiPort};

/// What happened to a submitted message.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Empty input, or a request was already in flight. Nothing was appended.
    Ignored,
    /// The backend answered; the bot message has been appended.
    Replied(ChatMessage),
    /// The request failed; a local error reply has been appended.
    Failed { reply: ChatMessage, error: ApiError },
}

impl SubmitOutcome {
    /// The bot message appended by this submission, if any.
    #[must_use]
    pub const fn reply(&self) -> Option<&ChatMessage> {
        match self {
            Self::Ignored => None,
            Self::Replied(reply) | Self::Failed { reply, .. } => Some(reply),
        }
    }
}

#[derive(Debug)]
struct SessionState {
    messages: Vec<ChatMessage>,
    in_flight: bool,
    last_error: Option<ApiError>,
}

impl SessionState {
    fn fresh() -> Self {
        Self {
            messages: vec![ChatMessage::welcome()],
            in_flight: false,
            last_error: None,
        }
    }
}

/// A single conversation with the companion backend.
pub struct ChatSession {
    api: Arc<dyn CompanionApiPort>,
    endpoint: ChatEndpoint,
    state: Mutex<SessionState>,
}

/// Clears the in-flight flag however the request future ends.
struct InFlight<'a> {
    session: &'a ChatSession,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.session.lock().in_flight = false;
    }
}

impl ChatSession {
    /// Start a conversation seeded with the welcome message.
    pub fn new(api: Arc<dyn CompanionApiPort>, endpoint: ChatEndpoint) -> Self {
        Self {
            api,
            endpoint,
            state: Mutex::new(SessionState::fresh()),
        }
    }

    pub const fn endpoint(&self) -> ChatEndpoint {
        self.endpoint
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // A poisoned lock only means a panic elsewhere; the message list is still valid.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Snapshot of the conversation, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    pub fn last_error(&self) -> Option<ApiError> {
        self.lock().last_error.clone()
    }

    /// Whether a request is currently awaiting the backend.
    pub fn is_busy(&self) -> bool {
        self.lock().in_flight
    }

    /// Reset to the welcome message.
    pub fn clear(&self) {
        let mut state = self.lock();
        let in_flight = state.in_flight;
        *state = SessionState::fresh();
        state.in_flight = in_flight;
    }

    /// Send user input to the backend and append the outcome.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::Ignored;
        }

        let _guard = {
            let mut state = self.lock();
            if state.in_flight {
                tracing::debug!("Ignoring submission while a request is in flight");
                return SubmitOutcome::Ignored;
            }
            state.in_flight = true;
            state.messages.push(ChatMessage::user(text));
            InFlight { session: self }
        };

        tracing::info!(endpoint = self.endpoint.as_str(), chars = text.len(), "Sending message");
        let result = match self.endpoint {
            ChatEndpoint::Analyze => self.api.analyze(text).await,
            ChatEndpoint::Chat => self.api.chat(text).await,
        };

        let mut state = self.lock();
        match result {
            Ok(reply) => {
                let message = ChatMessage::from_reply(reply);
                tracing::debug!(
                    sentiment = ?message.sentiment,
                    emotion = ?message.emotion,
                    provider = ?message.provider,
                    "Received reply"
                );
                state.last_error = None;
                state.messages.push(message.clone());
                SubmitOutcome::Replied(message)
            }
            Err(error) => {
                tracing::warn!(kind = %error.kind(), error = %error, "Companion request failed");
                let reply = ChatMessage::error_reply(error.user_message());
                state.last_error = Some(error.clone());
                state.messages.push(reply.clone());
                SubmitOutcome::Failed { reply, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::domain::{CompanionReply, Emotion, Provider, Sender, Sentiment};
    use crate::ports::companion::{self, UNAVAILABLE_MESSAGE};
    use crate::ports::{BackendHealth, MockCompanionApiPort};

    fn happy_reply() -> CompanionReply {
        CompanionReply {
            text: "That's wonderful to hear!".to_string(),
            sentiment: Some(Sentiment::Positive),
            emotion: Some(Emotion::Happy),
            emotion_confidence: Some(0.8),
            emotion_breakdown: BTreeMap::new(),
            provider: Some(Provider::Mock),
            debug: None,
        }
    }

    #[tokio::test]
    async fn starts_with_welcome_message() {
        let session = ChatSession::new(Arc::new(MockCompanionApiPort::new()), ChatEndpoint::Analyze);
        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].provider, Some(Provider::System));
    }

    #[tokio::test]
    async fn analyze_reply_is_appended() {
        let mut api = MockCompanionApiPort::new();
        api.expect_analyze()
            .withf(|text| text == "I am feeling amazing today!")
            .times(1)
            .returning(|_| Ok(happy_reply()));
        api.expect_chat().never();

        let session = ChatSession::new(Arc::new(api), ChatEndpoint::Analyze);
        let outcome = session.submit("  I am feeling amazing today!  ").await;

        let reply = outcome.reply().expect("reply appended");
        assert_eq!(reply.sentiment, Some(Sentiment::Positive));
        assert_eq!(reply.emotion, Some(Emotion::Happy));

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(messages[1].text, "I am feeling amazing today!");
        assert!(session.last_error().is_none());
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn chat_endpoint_is_used_in_chat_mode() {
        let mut api = MockCompanionApiPort::new();
        api.expect_chat().times(1).returning(|_| Ok(happy_reply()));
        api.expect_analyze().never();

        let session = ChatSession::new(Arc::new(api), ChatEndpoint::Chat);
        assert!(matches!(session.submit("hello").await, SubmitOutcome::Replied(_)));
    }

    #[tokio::test]
    async fn failure_becomes_error_reply() {
        let mut api = MockCompanionApiPort::new();
        api.expect_analyze()
            .returning(|_| Err(ApiError::Timeout { timeout_ms: 10_000 }));

        let session = ChatSession::new(Arc::new(api), ChatEndpoint::Analyze);
        let outcome = session.submit("hello").await;

        let SubmitOutcome::Failed { reply, error } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(reply.text, companion::TIMEOUT_MESSAGE);
        assert_eq!(reply.provider, Some(Provider::Error));
        assert_eq!(reply.sentiment, Some(Sentiment::Neutral));
        assert_eq!(error, ApiError::Timeout { timeout_ms: 10_000 });
        assert_eq!(session.last_error(), Some(error));
    }

    #[tokio::test]
    async fn unreachable_backend_uses_generic_message() {
        let mut api = MockCompanionApiPort::new();
        api.expect_analyze().returning(|_| {
            Err(ApiError::Unreachable {
                message: "connection refused".to_string(),
            })
        });

        let session = ChatSession::new(Arc::new(api), ChatEndpoint::Analyze);
        let outcome = session.submit("hello").await;
        assert_eq!(outcome.reply().map(|m| m.text.as_str()), Some(UNAVAILABLE_MESSAGE));
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let mut api = MockCompanionApiPort::new();
        api.expect_analyze().never();

        let session = ChatSession::new(Arc::new(api), ChatEndpoint::Analyze);
        assert_eq!(session.submit("   \n").await, SubmitOutcome::Ignored);
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn clear_resets_to_welcome() {
        let mut api = MockCompanionApiPort::new();
        api.expect_analyze().returning(|_| Ok(happy_reply()));

        let session = ChatSession::new(Arc::new(api), ChatEndpoint::Analyze);
        session.submit("hello").await;
        session.clear();

        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].provider, Some(Provider::System));
    }

    /// Holds every request until released.
    struct GatedApi {
        gate: Notify,
    }

    #[async_trait]
    impl CompanionApiPort for GatedApi {
        async fn analyze(&self, _text: &str) -> Result<CompanionReply, ApiError> {
            self.gate.notified().await;
            Ok(happy_reply())
        }

        async fn chat(&self, text: &str) -> Result<CompanionReply, ApiError> {
            self.analyze(text).await
        }

        async fn health(&self) -> Result<BackendHealth, ApiError> {
            Ok(BackendHealth {
                status: "ok".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn second_submission_is_ignored_while_in_flight() {
        let api = Arc::new(GatedApi { gate: Notify::new() });
        let session = ChatSession::new(api.clone(), ChatEndpoint::Analyze);

        let (first, second) = tokio::join!(session.submit("first"), async {
            assert!(session.is_busy());
            let outcome = session.submit("second").await;
            api.gate.notify_one();
            outcome
        });

        assert!(matches!(first, SubmitOutcome::Replied(_)));
        assert_eq!(second, SubmitOutcome::Ignored);
        assert!(!session.is_busy());

        let texts: Vec<_> = session.messages().into_iter().map(|m| m.text).collect();
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[1], "first");
    }
}
