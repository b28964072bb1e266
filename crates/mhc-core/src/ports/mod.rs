//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No HTTP client or filesystem types in any signature
//! - Traits are minimal; adapters live in the crates that own the transport

pub mod companion;
pub mod settings_repository;

use thiserror::Error;

pub use companion::{ApiError, BackendHealth, ChatEndpoint, CompanionApiPort};
pub use settings_repository::SettingsRepository;

#[cfg(test)]
pub use companion::MockCompanionApiPort;

/// Domain-specific errors for repository operations.
///
/// This error type abstracts away storage implementation details (file I/O,
/// JSON encoding) and provides a clean interface for services to handle
/// storage failures.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Storage backend error (filesystem, permissions, etc.).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Core error type for semantic domain errors.
///
/// Adapters should map this to their own error types (CLI exit codes,
/// UI notifications).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Settings validation error.
    #[error(transparent)]
    Settings(#[from] crate::settings::SettingsError),

    /// Companion backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Validation error (invalid input).
    #[error("Validation error: {0}")]
    Validation(String),
}
