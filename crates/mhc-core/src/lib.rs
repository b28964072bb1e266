#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    AnalysisDebug, ChatMessage, CompanionReply, Emotion, FailureKind, Provider, Sender, Sentiment,
    WELCOME_TEXT,
};
pub use paths::{DATA_DIR_ENV, PathError, data_root, settings_path};
pub use ports::{
    ApiError, BackendHealth, ChatEndpoint, CompanionApiPort, CoreError, RepositoryError,
    SettingsRepository,
};
pub use services::{ChatSession, SettingsService, SubmitOutcome};
pub use settings::{
    DEFAULT_API_BASE_URL, DEFAULT_SPEECH_RATE, Settings, SettingsError, SettingsUpdate, Theme,
    validate_settings,
};
