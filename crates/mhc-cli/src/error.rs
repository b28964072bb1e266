//! CLI-specific error types and mappings.
//!
//! Maps core, API and voice failures to exit codes and user-facing
//! messages.

use mhc_core::{ApiError, CoreError, FailureKind, PathError};
use mhc_voice::VoiceError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Invalid input from the command line.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (terminal closed, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The backend could not be reached or failed.
    #[error("{0}")]
    Unavailable(String),

    /// The host has no speech support for the request.
    #[error("Voice error: {0}")]
    Voice(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) | Self::Voice(_) => 1,
            Self::Arguments(_) => 2,   // EX_USAGE
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Storage(_) => 73,    // EX_CANTCREAT (closest fit)
            Self::Io(_) => 74,         // EX_IOERR
            Self::Config(_) => 78,     // EX_CONFIG
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(repo_err) => Self::Storage(repo_err.to_string()),
            CoreError::Settings(settings_err) => Self::Config(settings_err.to_string()),
            CoreError::Api(api_err) => Self::from(api_err),
            CoreError::Validation(msg) => Self::Arguments(msg),
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err.kind() {
            FailureKind::ValidationError => Self::Arguments(err.user_message().to_string()),
            FailureKind::NetworkFailure | FailureKind::Timeout | FailureKind::ServerError => {
                Self::Unavailable(format!("{} ({err})", err.user_message()))
            }
            _ => Self::Core(err.to_string()),
        }
    }
}

impl From<VoiceError> for CliError {
    fn from(err: VoiceError) -> Self {
        Self::Voice(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
