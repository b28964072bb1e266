//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no domain transforms, no I/O.

pub mod messages;
pub mod voices;

pub use messages::{render_message, render_transcript};
pub use voices::{format_capabilities, format_voice};
