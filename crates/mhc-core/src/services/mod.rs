//! Core services - orchestrators between ports and domain logic.
//!
//! Services here don't know about concrete implementations; the binary
//! wires them to the HTTP client and the settings store.

mod chat_session;
mod settings_service;

pub use chat_session::{ChatSession, SubmitOutcome};
pub use settings_service::SettingsService;
