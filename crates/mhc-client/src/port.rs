//! Port trait implementation for `CompanionClient`.
//!
//! Converts wire types into `CompanionReply` and transport errors into
//! `ApiError`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mhc_core::{
    AnalysisDebug, ApiError, BackendHealth, CompanionApiPort, CompanionReply, Emotion, Provider,
    Sentiment,
};

use crate::client::CompanionClient;
use crate::error::ClientError;
use crate::http::HttpBackend;
use crate::models::{AnalyzeResponse, ChatResponse, ErrorBody, WireDebug};

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert an internal `ClientError` to the core `ApiError`.
fn map_error(err: ClientError) -> ApiError {
    let mapped = match err {
        ClientError::Timeout { timeout_ms, .. } => ApiError::Timeout { timeout_ms },
        ClientError::Status { status: 400, body, .. } => ApiError::InvalidMessage {
            detail: ErrorBody::detail_of(&body).unwrap_or_else(|| "Bad request".to_string()),
        },
        ClientError::Status { status, .. } if (500..600).contains(&status) => {
            ApiError::Server { status }
        }
        ClientError::Status { status, .. } => ApiError::Status { status },
        ClientError::Network(e) => ApiError::Unreachable {
            message: e.to_string(),
        },
        ClientError::InvalidUrl(e) => ApiError::Unreachable {
            message: format!("invalid URL: {e}"),
        },
        ClientError::JsonParse(e) => ApiError::InvalidResponse {
            message: e.to_string(),
        },
        ClientError::InvalidResponse { message } => ApiError::InvalidResponse { message },
    };
    tracing::warn!(error = %mapped, kind = ?mapped.kind(), "Companion request failed");
    mapped
}

// ============================================================================
// Type Conversions
// ============================================================================

fn to_debug(debug: WireDebug) -> AnalysisDebug {
    AnalysisDebug {
        score: debug.score,
        pos_hits: debug.pos_hits,
        neg_hits: debug.neg_hits,
        emotion_scores: debug.emotion_scores,
    }
}

/// Per-emotion scores from the analyzer's debug block, as a breakdown.
#[allow(clippy::cast_possible_truncation)]
fn breakdown_from(debug: Option<&WireDebug>) -> BTreeMap<String, f32> {
    debug
        .map(|d| {
            d.emotion_scores
                .iter()
                .map(|(emotion, score)| (emotion.clone(), *score as f32))
                .collect()
        })
        .unwrap_or_default()
}

fn from_analyze(response: AnalyzeResponse) -> CompanionReply {
    let emotion_breakdown = breakdown_from(response.debug.as_ref());
    CompanionReply {
        text: response.reply,
        sentiment: response.sentiment.as_deref().map(Sentiment::from_wire),
        emotion: response.emotion.as_deref().map(Emotion::parse),
        emotion_confidence: response.emotion_confidence,
        emotion_breakdown,
        provider: response.provider.as_deref().map(Provider::parse),
        debug: response.debug.map(to_debug),
    }
}

fn from_chat(response: ChatResponse) -> Result<CompanionReply, ClientError> {
    let text = response
        .text()
        .ok_or_else(|| ClientError::InvalidResponse {
            message: "reply has neither `response` nor `reply`".to_string(),
        })?
        .to_string();

    Ok(CompanionReply {
        text,
        sentiment: response.sentiment.as_deref().and_then(Sentiment::parse),
        emotion: response.emotion.as_deref().map(Emotion::parse),
        emotion_confidence: response.emotion_confidence,
        emotion_breakdown: response.emotion_breakdown.unwrap_or_default(),
        provider: response.provider.as_deref().map(Provider::parse),
        debug: None,
    })
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend> CompanionApiPort for CompanionClient<B> {
    async fn analyze(&self, text: &str) -> Result<CompanionReply, ApiError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ApiError::EmptyMessage);
        }
        let response = self.post_analyze(text).await.map_err(map_error)?;
        Ok(from_analyze(response))
    }

    async fn chat(&self, message: &str) -> Result<CompanionReply, ApiError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ApiError::EmptyMessage);
        }
        let response = self.post_chat(message).await.map_err(map_error)?;
        from_chat(response).map_err(map_error)
    }

    async fn health(&self) -> Result<BackendHealth, ApiError> {
        let response = self.get_health().await.map_err(map_error)?;
        Ok(BackendHealth {
            status: response.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use mhc_core::ports::companion::{
        INVALID_MESSAGE, SERVER_ERROR_MESSAGE, TIMEOUT_MESSAGE, UNAVAILABLE_MESSAGE,
    };
    use serde_json::json;

    fn client(backend: FakeBackend) -> CompanionClient<FakeBackend> {
        CompanionClient::with_backend("http://127.0.0.1:8000", backend).unwrap()
    }

    fn happy_analysis() -> serde_json::Value {
        json!({
            "provider": "mock",
            "sentiment": "pos",
            "emotion": "happy",
            "emotion_confidence": 0.8,
            "reply": "That's wonderful! What made today so great?",
            "debug": {"score": 1.0, "pos_hits": ["amazing"], "neg_hits": [], "emotion_scores": {"happy": 0.8}}
        })
    }

    // ── Conversions ────────────────────────────────────────────────

    #[tokio::test]
    async fn test_analyze_maps_reply() {
        let backend =
            FakeBackend::new().with_response("/analyze", CannedResponse::Json(happy_analysis()));
        let client = client(backend);

        let reply = client.analyze("  I am feeling amazing today!  ").await.unwrap();
        assert_eq!(reply.text, "That's wonderful! What made today so great?");
        assert_eq!(reply.sentiment, Some(Sentiment::Positive));
        assert_eq!(reply.emotion, Some(Emotion::Happy));
        assert_eq!(reply.provider, Some(Provider::Mock));
        assert_eq!(reply.emotion_breakdown.len(), 1);
        assert!((reply.emotion_breakdown["happy"] - 0.8).abs() < 1e-6);
        assert_eq!(reply.debug.unwrap().pos_hits, vec!["amazing".to_string()]);

        let requests = client.backend.requests();
        assert_eq!(requests[0].url, "http://127.0.0.1:8000/analyze");
        assert_eq!(
            requests[0].body,
            Some(json!({"text": "I am feeling amazing today!"}))
        );
    }

    #[tokio::test]
    async fn test_chat_maps_reply_and_breakdown() {
        let backend = FakeBackend::new().with_response(
            "/chat",
            CannedResponse::Json(json!({
                "response": "I hear you.",
                "sentiment": "negative",
                "emotion": "anxious",
                "emotion_confidence": 0.6,
                "emotion_breakdown": {"anxious": 0.6, "sad": 0.3},
                "provider": "gemini"
            })),
        );
        let client = client(backend);

        let reply = client.chat("exams tomorrow").await.unwrap();
        assert_eq!(reply.text, "I hear you.");
        assert_eq!(reply.sentiment, Some(Sentiment::Negative));
        assert_eq!(reply.emotion, Some(Emotion::Anxious));
        assert_eq!(reply.emotion_breakdown.len(), 2);
        assert_eq!(reply.provider, Some(Provider::Gemini));
        assert_eq!(
            client.backend.requests()[0].body,
            Some(json!({"message": "exams tomorrow"}))
        );
    }

    #[tokio::test]
    async fn test_chat_accepts_analyze_shape() {
        let backend =
            FakeBackend::new().with_response("/chat", CannedResponse::Json(happy_analysis()));
        let reply = client(backend).chat("hi").await.unwrap();
        assert_eq!(reply.text, "That's wonderful! What made today so great?");
        assert_eq!(reply.sentiment, Some(Sentiment::Positive));
    }

    #[tokio::test]
    async fn test_chat_without_text_is_invalid_response() {
        let backend = FakeBackend::new()
            .with_response("/chat", CannedResponse::Json(json!({"provider": "mock"})));
        let err = client(backend).chat("hi").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse { .. }));
        assert_eq!(err.user_message(), UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_empty_message_never_leaves_the_client() {
        let client = client(FakeBackend::new());
        assert_eq!(client.analyze("   ").await, Err(ApiError::EmptyMessage));
        assert_eq!(client.chat("").await, Err(ApiError::EmptyMessage));
        assert!(client.backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_health() {
        let backend =
            FakeBackend::new().with_response("/health", CannedResponse::Json(json!({"status": "ok"})));
        let health = client(backend).health().await.unwrap();
        assert!(health.is_ok());
    }

    // ── Error mapping ──────────────────────────────────────────────

    async fn analyze_error(response: CannedResponse) -> ApiError {
        let backend = FakeBackend::new().with_response("/analyze", response);
        client(backend).analyze("hello").await.unwrap_err()
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_message() {
        let err = analyze_error(CannedResponse::Timeout).await;
        assert_eq!(err, ApiError::Timeout { timeout_ms: 10_000 });
        assert_eq!(err.user_message(), TIMEOUT_MESSAGE);
    }

    #[tokio::test]
    async fn test_400_maps_to_invalid_message_with_detail() {
        let err = analyze_error(CannedResponse::Status {
            status: 400,
            body: r#"{"detail":"Text cannot be empty"}"#.to_string(),
        })
        .await;
        assert_eq!(
            err,
            ApiError::InvalidMessage {
                detail: "Text cannot be empty".to_string()
            }
        );
        assert_eq!(err.user_message(), INVALID_MESSAGE);
    }

    #[tokio::test]
    async fn test_5xx_maps_to_server_error() {
        for status in [500, 502, 503] {
            let err = analyze_error(CannedResponse::Status {
                status,
                body: String::new(),
            })
            .await;
            assert_eq!(err, ApiError::Server { status });
            assert_eq!(err.user_message(), SERVER_ERROR_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_other_status_maps_to_unavailable() {
        let err = analyze_error(CannedResponse::Status {
            status: 422,
            body: String::new(),
        })
        .await;
        assert_eq!(err, ApiError::Status { status: 422 });
        assert_eq!(err.user_message(), UNAVAILABLE_MESSAGE);

        // No canned response: the fake answers 404.
        let err = client(FakeBackend::new()).health().await.unwrap_err();
        assert_eq!(err, ApiError::Status { status: 404 });
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_invalid_response() {
        let err = analyze_error(CannedResponse::Json(json!({"unexpected": true}))).await;
        assert!(matches!(err, ApiError::InvalidResponse { .. }));
        assert_eq!(err.user_message(), UNAVAILABLE_MESSAGE);
    }
}
