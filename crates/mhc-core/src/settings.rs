//! Settings domain types and validation.
//!
//! These are the client's local preferences: theme, backend location and
//! speech playback defaults. Pure domain types with no storage concerns.

use serde::{Deserialize, Serialize};

use crate::ports::ChatEndpoint;

/// Default backend base URL.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default speech rate for spoken replies.
pub const DEFAULT_SPEECH_RATE: f32 = 0.9;

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(SettingsError::UnknownTheme(other.to_string())),
        }
    }
}

/// Application settings structure.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Saved theme; `None` follows the system preference.
    pub theme: Option<Theme>,

    /// Backend base URL.
    pub api_base_url: Option<String>,

    /// Which endpoint conversations use.
    pub endpoint: Option<ChatEndpoint>,

    /// Speech rate for spoken replies (0.1–10.0).
    pub speech_rate: Option<f32>,

    /// Whether bot replies are spoken automatically.
    pub auto_speak: Option<bool>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            theme: None,
            api_base_url: Some(DEFAULT_API_BASE_URL.to_string()),
            endpoint: Some(ChatEndpoint::Analyze),
            speech_rate: Some(DEFAULT_SPEECH_RATE),
            auto_speak: Some(false),
        }
    }

    /// Theme to render with, falling back to the system preference.
    #[must_use]
    pub fn effective_theme(&self, system_prefers_dark: bool) -> Theme {
        self.theme.unwrap_or(if system_prefers_dark {
            Theme::Dark
        } else {
            Theme::Light
        })
    }

    #[must_use]
    pub fn effective_api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    #[must_use]
    pub fn effective_speech_rate(&self) -> f32 {
        self.speech_rate.unwrap_or(DEFAULT_SPEECH_RATE)
    }

    #[must_use]
    pub fn effective_endpoint(&self) -> ChatEndpoint {
        self.endpoint.unwrap_or_default()
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(theme) = other.theme {
            self.theme = theme;
        }
        if let Some(ref url) = other.api_base_url {
            self.api_base_url.clone_from(url);
        }
        if let Some(endpoint) = other.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(rate) = other.speech_rate {
            self.speech_rate = rate;
        }
        if let Some(auto_speak) = other.auto_speak {
            self.auto_speak = auto_speak;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub theme: Option<Option<Theme>>,
    pub api_base_url: Option<Option<String>>,
    pub endpoint: Option<Option<ChatEndpoint>>,
    pub speech_rate: Option<Option<f32>>,
    pub auto_speak: Option<Option<bool>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Speech rate must be between 0.1 and 10.0, got {0}")]
    InvalidSpeechRate(f32),

    #[error("API base URL must start with http:// or https://, got '{0}'")]
    InvalidApiUrl(String),

    #[error("Unknown theme '{0}' (expected 'light' or 'dark')")]
    UnknownTheme(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(rate) = settings.speech_rate {
        if !(0.1..=10.0).contains(&rate) {
            return Err(SettingsError::InvalidSpeechRate(rate));
        }
    }

    if let Some(ref url) = settings.api_base_url {
        let trimmed = url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(SettingsError::InvalidApiUrl(url.clone()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::with_defaults();
        assert_eq!(settings.effective_api_base_url(), DEFAULT_API_BASE_URL);
        assert!((settings.effective_speech_rate() - 0.9).abs() < f32::EPSILON);
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_theme_follows_system_until_saved() {
        let mut settings = Settings::default();
        assert_eq!(settings.effective_theme(true), Theme::Dark);
        assert_eq!(settings.effective_theme(false), Theme::Light);

        settings.theme = Some(Theme::Light);
        assert_eq!(settings.effective_theme(true), Theme::Light);
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let mut settings = Settings::with_defaults();
        settings.merge(&SettingsUpdate {
            theme: Some(Some(Theme::Dark)),
            ..Default::default()
        });
        assert_eq!(settings.theme, Some(Theme::Dark));
        assert_eq!(settings.effective_api_base_url(), DEFAULT_API_BASE_URL);

        settings.merge(&SettingsUpdate {
            theme: Some(None),
            ..Default::default()
        });
        assert_eq!(settings.theme, None);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let settings = Settings {
            speech_rate: Some(12.0),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidSpeechRate(_))
        ));

        let settings = Settings {
            api_base_url: Some("localhost:8000".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::InvalidApiUrl(_))
        ));
    }

    #[test]
    fn test_theme_parsing_and_toggle() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
