//! Health command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the health command.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let health = ctx.api.health().await.map_err(CliError::from)?;
    if !health.is_ok() {
        return Err(CliError::Unavailable(format!(
            "Backend at {} reported status '{}'",
            ctx.api_base_url, health.status
        ))
        .into());
    }

    println!("✅ Backend at {} is up", ctx.api_base_url);
    Ok(())
}
