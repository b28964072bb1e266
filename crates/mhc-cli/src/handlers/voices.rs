//! Voices command handler.
//!
//! Reports what the speech host supports, waits (bounded) for the voice
//! list like a spoken reply would, and marks the voice replies will use.

use anyhow::Result;
use mhc_voice::VoiceCatalog;

use crate::bootstrap::CliContext;
use crate::presentation::{format_capabilities, format_voice};

/// Execute the voices command.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let (voice, _events) = ctx.voice_coordinator(false);
    let capabilities = voice.initialize();
    println!("{}", format_capabilities(capabilities));

    let microphone = if voice.recognition().test_microphone().await {
        "available"
    } else {
        "unavailable"
    };
    println!("Microphone:         {microphone}");

    let Some(catalog) = voice.synthesis().catalog() else {
        return Ok(());
    };
    let voices = catalog
        .wait_until_ready(voice.config().timing.catalog_wait)
        .await;
    if voices.is_empty() {
        println!("\nNo voices loaded; replies use the host default.");
        return Ok(());
    }

    let preferred = VoiceCatalog::preferred_voice(&voices);
    println!("\nVoices ({}):", voices.len());
    for v in &voices {
        println!("{}", format_voice(v, preferred.as_ref() == Some(v)));
    }
    Ok(())
}
