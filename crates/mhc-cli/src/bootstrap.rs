//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter:
//! - Settings persistence (JSON file in the data directory)
//! - Companion backend client (via mhc-client)
//! - Speech host for the voice coordinator (terminal)
//!
//! Command handlers receive the composed `CliContext`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use mhc_client::{CompanionClientConfig, DEFAULT_TIMEOUT, DefaultCompanionClient};
use mhc_core::{
    ChatEndpoint, ChatSession, CompanionApiPort, Settings, SettingsService, settings_path,
};
use mhc_voice::{
    DEFAULT_PITCH, SpeakOptions, SpeechHost, VoiceCoordinator, VoiceCoordinatorConfig, VoiceEvent,
};
use tokio::sync::mpsc;

use crate::error::CliError;
use crate::parser::Cli;
use crate::settings_store::JsonSettingsStore;
use crate::terminal_host::TerminalSpeechHost;
use crate::utils::LineSource;

/// Per-invocation overrides taken from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Backend base URL; `None` uses the saved setting.
    pub api_url: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Endpoint; `None` uses the saved setting.
    pub mode: Option<ChatEndpoint>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout: DEFAULT_TIMEOUT,
            mode: None,
        }
    }
}

impl CliConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            api_url: cli.api_url.clone(),
            timeout: Duration::from_secs(cli.timeout_secs),
            mode: cli.mode.map(ChatEndpoint::from),
        }
    }

    /// Saved settings with this invocation's overrides applied. Not persisted.
    fn apply(&self, saved: &Settings) -> Settings {
        let mut effective = saved.clone();
        if let Some(url) = &self.api_url {
            effective.api_base_url = Some(url.clone());
        }
        if let Some(mode) = self.mode {
            effective.endpoint = Some(mode);
        }
        effective
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Persisted preferences.
    pub settings: SettingsService,
    /// Companion backend.
    pub api: Arc<dyn CompanionApiPort>,
    /// Backend base URL in use, for messages.
    pub api_base_url: String,
    /// Endpoint conversations use.
    pub endpoint: ChatEndpoint,
    /// Rate for spoken replies.
    pub speech_rate: f32,
    /// Speak replies without being asked.
    pub auto_speak: bool,
    /// Terminal input shared by the chat loop and the speech host.
    pub input: LineSource,
    /// Host speech capabilities.
    pub speech_host: Arc<dyn SpeechHost>,
}

impl CliContext {
    /// A fresh conversation against the configured endpoint.
    pub fn chat_session(&self) -> ChatSession {
        ChatSession::new(Arc::clone(&self.api), self.endpoint)
    }

    /// A voice coordinator over the context's speech host.
    ///
    /// `speak` forces spoken replies on for this coordinator.
    pub fn voice_coordinator(
        &self,
        speak: bool,
    ) -> (VoiceCoordinator, mpsc::UnboundedReceiver<VoiceEvent>) {
        let config = VoiceCoordinatorConfig {
            speak: SpeakOptions {
                rate: Some(self.speech_rate),
                pitch: Some(DEFAULT_PITCH),
                voice: None,
            },
            auto_speak: speak || self.auto_speak,
            ..VoiceCoordinatorConfig::default()
        };
        VoiceCoordinator::new(Arc::clone(&self.speech_host), config)
    }
}

/// Bootstrap the CLI application.
///
/// Loads the saved settings, applies the command-line overrides and builds
/// the backend client and terminal speech host.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let path = settings_path().map_err(CliError::from)?;
    tracing::debug!(path = %path.display(), "Using settings file");
    let settings = SettingsService::new(Arc::new(JsonSettingsStore::new(path)));

    let saved = settings.get().await.map_err(CliError::from)?;
    let effective = config.apply(&saved);

    let client_config = CompanionClientConfig::new()
        .with_base_url(effective.effective_api_base_url())
        .with_timeout(config.timeout);
    let client = DefaultCompanionClient::new(&client_config).map_err(|e| {
        CliError::Config(format!(
            "invalid API URL '{}': {e}",
            effective.effective_api_base_url()
        ))
    })?;

    let input = LineSource::stdin();
    let speech_host: Arc<dyn SpeechHost> = Arc::new(TerminalSpeechHost::new(input.clone()));

    Ok(bootstrap_with(
        settings,
        Arc::new(client),
        &effective,
        input,
        speech_host,
    ))
}

/// Bootstrap with injected adapters (for testing).
pub fn bootstrap_with(
    settings: SettingsService,
    api: Arc<dyn CompanionApiPort>,
    effective: &Settings,
    input: LineSource,
    speech_host: Arc<dyn SpeechHost>,
) -> CliContext {
    CliContext {
        settings,
        api,
        api_base_url: effective.effective_api_base_url().to_string(),
        endpoint: effective.effective_endpoint(),
        speech_rate: effective.effective_speech_rate(),
        auto_speak: effective.auto_speak.unwrap_or(false),
        input,
        speech_host,
    }
}
