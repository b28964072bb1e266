//! Command handlers against a stub backend, a temp settings file and the
//! terminal speech host fed from canned input.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mhc_cli::handlers::{self, chat::ChatArgs};
use mhc_cli::utils::LineSource;
use mhc_cli::{CliContext, CliError, JsonSettingsStore, TerminalSpeechHost, ThemeArg, bootstrap_with};
use mhc_core::{
    ApiError, BackendHealth, CompanionApiPort, CompanionReply, Provider, Sentiment, Settings,
    SettingsService, Theme,
};
use tempfile::TempDir;

// ── Stub backend ───────────────────────────────────────────────────

#[derive(Default)]
struct StubApi {
    received: Mutex<Vec<String>>,
    failure: Option<ApiError>,
    health_status: Option<String>,
}

impl StubApi {
    fn failing(error: ApiError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    fn reply(&self, text: &str) -> Result<CompanionReply, ApiError> {
        self.received.lock().unwrap().push(text.to_string());
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(CompanionReply {
            text: format!("You said: {text}"),
            sentiment: Some(Sentiment::Positive),
            emotion: None,
            emotion_confidence: None,
            emotion_breakdown: Default::default(),
            provider: Some(Provider::Mock),
            debug: None,
        })
    }
}

#[async_trait]
impl CompanionApiPort for StubApi {
    async fn analyze(&self, text: &str) -> Result<CompanionReply, ApiError> {
        self.reply(text)
    }

    async fn chat(&self, message: &str) -> Result<CompanionReply, ApiError> {
        self.reply(message)
    }

    async fn health(&self) -> Result<BackendHealth, ApiError> {
        Ok(BackendHealth {
            status: self.health_status.clone().unwrap_or_else(|| "ok".to_string()),
        })
    }
}

fn context(api: Arc<StubApi>, dir: &TempDir, input: &'static str) -> CliContext {
    let input = LineSource::from_reader(Cursor::new(input.as_bytes()));
    let settings = SettingsService::new(Arc::new(JsonSettingsStore::new(
        dir.path().join("settings.json"),
    )));
    let host = Arc::new(TerminalSpeechHost::new(input.clone()));
    bootstrap_with(settings, api, &Settings::with_defaults(), input, host)
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}

// ── analyze / health ───────────────────────────────────────────────

#[tokio::test]
async fn analyze_joins_words_into_one_message() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(StubApi::default());
    let ctx = context(Arc::clone(&api), &dir, "");

    let words = ["I", "am", "feeling", "amazing"].map(String::from);
    handlers::analyze::execute(&ctx, &words).await.unwrap();
    assert_eq!(api.received(), vec!["I am feeling amazing".to_string()]);
}

#[tokio::test]
async fn analyze_failure_sets_exit_code() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(StubApi::failing(ApiError::Timeout { timeout_ms: 10_000 }));
    let ctx = context(api, &dir, "");

    let err = handlers::analyze::execute(&ctx, &["hello".to_string()])
        .await
        .unwrap_err();
    assert_eq!(exit_code(&err), 69);
    assert!(err.to_string().contains("Request timed out"));
}

#[tokio::test]
async fn analyze_rejects_blank_text() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(StubApi::default());
    let ctx = context(Arc::clone(&api), &dir, "");

    let err = handlers::analyze::execute(&ctx, &["  ".to_string()])
        .await
        .unwrap_err();
    assert_eq!(exit_code(&err), 2);
    assert!(api.received().is_empty());
}

#[tokio::test]
async fn health_reports_degraded_backend() {
    let dir = TempDir::new().unwrap();
    let ctx = context(Arc::new(StubApi::default()), &dir, "");
    handlers::health::execute(&ctx).await.unwrap();

    let api = Arc::new(StubApi {
        health_status: Some("degraded".to_string()),
        ..StubApi::default()
    });
    let ctx = context(api, &dir, "");
    let err = handlers::health::execute(&ctx).await.unwrap_err();
    assert_eq!(exit_code(&err), 69);
}

// ── theme ──────────────────────────────────────────────────────────

#[tokio::test]
async fn theme_is_saved_toggled_and_forgotten() {
    let dir = TempDir::new().unwrap();
    let ctx = context(Arc::new(StubApi::default()), &dir, "");

    handlers::theme::execute_with(&ctx, Some(ThemeArg::Dark), false)
        .await
        .unwrap();
    assert_eq!(ctx.settings.get().await.unwrap().theme, Some(Theme::Dark));

    handlers::theme::execute_with(&ctx, Some(ThemeArg::Toggle), false)
        .await
        .unwrap();
    assert_eq!(ctx.settings.get().await.unwrap().theme, Some(Theme::Light));

    handlers::theme::execute_with(&ctx, Some(ThemeArg::System), true)
        .await
        .unwrap();
    assert_eq!(ctx.settings.get().await.unwrap().theme, None);

    // Following a dark terminal, toggle saves light.
    handlers::theme::execute_with(&ctx, Some(ThemeArg::Toggle), true)
        .await
        .unwrap();
    assert_eq!(ctx.settings.get().await.unwrap().theme, Some(Theme::Light));

    handlers::theme::execute_with(&ctx, None, true).await.unwrap();
    assert!(dir.path().join("settings.json").exists());
}

// ── chat ───────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_sends_typed_and_spoken_messages() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(StubApi::default());
    let ctx = context(
        Arc::clone(&api),
        &dir,
        "hello\n\n/help\n/voice\nspoken words\n/stop\n/clear\n/quit\nnever sent\n",
    );

    handlers::chat::execute(&ctx, ChatArgs::default()).await.unwrap();
    assert_eq!(
        api.received(),
        vec!["hello".to_string(), "spoken words".to_string()]
    );
}

#[tokio::test]
async fn chat_ends_at_end_of_input() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(StubApi::default());
    let ctx = context(Arc::clone(&api), &dir, "first\nsecond");

    handlers::chat::execute(
        &ctx,
        ChatArgs {
            speak: true,
            voice_input: false,
        },
    )
    .await
    .unwrap();
    assert_eq!(api.received(), vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn chat_voice_turns_skip_silence() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(StubApi::default());
    let ctx = context(Arc::clone(&api), &dir, "first\n   \nsecond\n");

    handlers::chat::execute(
        &ctx,
        ChatArgs {
            speak: false,
            voice_input: true,
        },
    )
    .await
    .unwrap();
    assert_eq!(api.received(), vec!["first".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn failed_replies_do_not_end_the_chat() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(StubApi::failing(ApiError::Server { status: 500 }));
    let ctx = context(Arc::clone(&api), &dir, "one\ntwo\n/quit\n");

    handlers::chat::execute(&ctx, ChatArgs::default()).await.unwrap();
    assert_eq!(api.received().len(), 2);
}

// ── voices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn voices_lists_the_terminal_voice() {
    let dir = TempDir::new().unwrap();
    let ctx = context(Arc::new(StubApi::default()), &dir, "");
    handlers::voices::execute(&ctx).await.unwrap();
}
