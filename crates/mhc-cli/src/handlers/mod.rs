//! Command handlers.
//!
//! Handlers follow the canonical pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call core services, the API port or the voice coordinator
//!   3. Format output for the terminal
//!
//! Failures that should set the exit code are raised as `CliError`.

pub mod analyze;
pub mod chat;
pub mod health;
pub mod theme;
pub mod voices;
