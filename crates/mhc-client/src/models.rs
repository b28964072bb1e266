//! Wire types for the companion backend.
//!
//! These mirror the JSON exactly and are converted to core types in
//! `port.rs`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// `POST /analyze` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    pub reply: String,
    /// `pos`, `neg` or `neu`.
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub emotion_confidence: Option<f32>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub debug: Option<WireDebug>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WireDebug {
    pub score: f64,
    pub pos_hits: Vec<String>,
    pub neg_hits: Vec<String>,
    pub emotion_scores: BTreeMap<String, f64>,
}

/// `POST /chat` response.
///
/// Backends that answer `/chat` with the `/analyze` shape put the text in
/// `reply` instead of `response`; both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub emotion_confidence: Option<f32>,
    #[serde(default)]
    pub emotion_breakdown: Option<BTreeMap<String, f32>>,
    #[serde(default)]
    pub provider: Option<String>,
}

impl ChatResponse {
    /// The reply text, whichever field carried it.
    pub fn text(&self) -> Option<&str> {
        self.response.as_deref().or(self.reply.as_deref())
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// FastAPI error body: `{"detail": "..."}` or a list of validation issues.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Extract a readable detail from a raw error body.
    pub fn detail_of(body: &str) -> Option<String> {
        let parsed: Self = serde_json::from_str(body).ok()?;
        match parsed.detail {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analyze_response_full() {
        let json = json!({
            "provider": "mock",
            "sentiment": "pos",
            "emotion": "happy",
            "emotion_confidence": 0.8,
            "reply": "That's wonderful to hear!",
            "debug": {
                "score": 2.0,
                "pos_hits": ["amazing"],
                "neg_hits": [],
                "emotion_scores": {"happy": 0.8, "neutral": 0.2}
            }
        });
        let parsed: AnalyzeResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.sentiment.as_deref(), Some("pos"));
        assert_eq!(parsed.provider.as_deref(), Some("mock"));
        let debug = parsed.debug.unwrap();
        assert_eq!(debug.pos_hits, vec!["amazing".to_string()]);
        assert_eq!(debug.emotion_scores.len(), 2);
    }

    #[test]
    fn test_analyze_response_minimal() {
        let parsed: AnalyzeResponse = serde_json::from_value(json!({"reply": "ok"})).unwrap();
        assert!(parsed.sentiment.is_none());
        assert!(parsed.debug.is_none());
    }

    #[test]
    fn test_analyze_response_requires_reply() {
        let result: Result<AnalyzeResponse, _> =
            serde_json::from_value(json!({"sentiment": "pos"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_chat_response_prefers_response_field() {
        let parsed: ChatResponse =
            serde_json::from_value(json!({"response": "from chat", "reply": "from analyze"}))
                .unwrap();
        assert_eq!(parsed.text(), Some("from chat"));

        let parsed: ChatResponse = serde_json::from_value(json!({"reply": "fallback"})).unwrap();
        assert_eq!(parsed.text(), Some("fallback"));

        let parsed: ChatResponse = serde_json::from_value(json!({"provider": "mock"})).unwrap();
        assert_eq!(parsed.text(), None);
    }

    #[test]
    fn test_request_shapes() {
        assert_eq!(
            serde_json::to_value(AnalyzeRequest { text: "hi" }).unwrap(),
            json!({"text": "hi"})
        );
        assert_eq!(
            serde_json::to_value(ChatRequest { message: "hi" }).unwrap(),
            json!({"message": "hi"})
        );
    }

    #[test]
    fn test_error_body_detail() {
        assert_eq!(
            ErrorBody::detail_of(r#"{"detail":"Text cannot be empty"}"#).as_deref(),
            Some("Text cannot be empty")
        );
        assert!(
            ErrorBody::detail_of(r#"{"detail":[{"loc":["body","text"]}]}"#)
                .unwrap()
                .contains("loc")
        );
        assert_eq!(ErrorBody::detail_of("<html>bad gateway</html>"), None);
    }
}
