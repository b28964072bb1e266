//! Voice diagnostics formatting.

use mhc_voice::{HostVoice, VoiceCapabilities};

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub fn format_capabilities(capabilities: VoiceCapabilities) -> String {
    format!(
        "Speech recognition: {}\nSpeech synthesis:   {}",
        yes_no(capabilities.recognition),
        yes_no(capabilities.synthesis)
    )
}

/// One catalog row; `preferred` marks the voice replies will use.
pub fn format_voice(voice: &HostVoice, preferred: bool) -> String {
    let marker = if preferred { "*" } else { " " };
    let mut flags = Vec::new();
    if voice.is_default {
        flags.push("default");
    }
    if voice.local_service {
        flags.push("local");
    }
    format!(
        "{marker} {:<24} {:<8} {}",
        voice.name,
        voice.lang,
        flags.join(", ")
    )
    .trim_end()
    .to_string()
}
