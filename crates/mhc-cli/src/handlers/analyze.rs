//! Analyze command handler.
//!
//! Sends one message through a fresh chat session and prints the bot's
//! reply. A failed request still prints the fallback reply the chat would
//! show, then exits non-zero.

use anyhow::Result;
use mhc_core::SubmitOutcome;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::render_message;

/// Execute the analyze command.
pub async fn execute(ctx: &CliContext, words: &[String]) -> Result<()> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        return Err(CliError::Arguments("message cannot be empty".to_string()).into());
    }

    let session = ctx.chat_session();
    match session.submit(&text).await {
        SubmitOutcome::Replied(reply) => {
            println!("{}", render_message(&reply));
            Ok(())
        }
        SubmitOutcome::Failed { reply, error } => {
            println!("{}", render_message(&reply));
            Err(CliError::from(error).into())
        }
        SubmitOutcome::Ignored => {
            Err(CliError::Arguments("message cannot be empty".to_string()).into())
        }
    }
}
