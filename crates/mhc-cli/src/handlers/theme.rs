//! Theme command handler.
//!
//! With no value, prints the effective theme. `system` forgets the saved
//! theme so the terminal's colours decide again.

use anyhow::Result;
use mhc_core::{SettingsUpdate, Theme};

use crate::bootstrap::CliContext;
use crate::commands::ThemeArg;
use crate::error::CliError;

/// Environment variable some terminals set to `fg;bg` colour indices.
const COLORFGBG_ENV: &str = "COLORFGBG";

/// Whether a `COLORFGBG` value describes a dark background.
///
/// The background is the last field; indices 0-6 and 8 are dark.
pub fn parse_colorfgbg(value: &str) -> Option<bool> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(background < 7 || background == 8)
}

/// The terminal's colour preference. Light when unknown.
pub fn system_prefers_dark() -> bool {
    std::env::var(COLORFGBG_ENV)
        .ok()
        .and_then(|v| parse_colorfgbg(&v))
        .unwrap_or(false)
}

/// Execute the theme command.
pub async fn execute(ctx: &CliContext, value: Option<ThemeArg>) -> Result<()> {
    execute_with(ctx, value, system_prefers_dark()).await
}

/// [`execute`] with an explicit system preference.
pub async fn execute_with(
    ctx: &CliContext,
    value: Option<ThemeArg>,
    system_dark: bool,
) -> Result<()> {
    let theme = match value {
        None => {
            let settings = ctx.settings.get().await.map_err(CliError::from)?;
            let source = if settings.theme.is_some() {
                "saved"
            } else {
                "following the terminal"
            };
            println!(
                "Theme: {} ({source})",
                settings.effective_theme(system_dark).as_str()
            );
            return Ok(());
        }
        Some(ThemeArg::Toggle) => ctx
            .settings
            .toggle_theme(system_dark)
            .await
            .map_err(CliError::from)?,
        Some(ThemeArg::Dark) => set(ctx, Some(Theme::Dark), system_dark).await?,
        Some(ThemeArg::Light) => set(ctx, Some(Theme::Light), system_dark).await?,
        Some(ThemeArg::System) => set(ctx, None, system_dark).await?,
    };

    tracing::info!(theme = theme.as_str(), "Theme changed");
    println!("Theme: {}", theme.as_str());
    Ok(())
}

async fn set(ctx: &CliContext, theme: Option<Theme>, system_dark: bool) -> Result<Theme> {
    let settings = ctx
        .settings
        .update(SettingsUpdate {
            theme: Some(theme),
            ..Default::default()
        })
        .await
        .map_err(CliError::from)?;
    Ok(settings.effective_theme(system_dark))
}
