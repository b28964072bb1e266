//! Subcommand definitions.

use clap::{Subcommand, ValueEnum};

/// Argument for `mhc theme`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Dark,
    Light,
    /// Flip the current theme
    Toggle,
    /// Forget the saved theme and follow the terminal
    System,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive conversation
    Chat {
        /// Read bot replies aloud
        #[arg(long)]
        speak: bool,

        /// Capture every turn through the voice input path
        #[arg(long = "voice-input")]
        voice_input: bool,
    },
    /// Send one message and print the reply
    Analyze {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Check that the backend is up
    Health,
    /// Show or change the colour theme
    Theme {
        #[arg(value_enum)]
        value: Option<ThemeArg>,
    },
    /// Show speech capabilities and available voices
    Voices,
}

#[cfg(test)]
mod tests {
    use crate::parser::Cli;
    use clap::Parser;

    use super::*;

    #[test]
    fn test_chat_flags() {
        let cli = Cli::parse_from(["mhc", "chat", "--speak", "--voice-input"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Chat {
                speak: true,
                voice_input: true
            })
        ));
    }

    #[test]
    fn test_analyze_collects_words() {
        let cli = Cli::parse_from(["mhc", "analyze", "I", "am", "feeling", "amazing"]);
        let Some(Commands::Analyze { text }) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(text.join(" "), "I am feeling amazing");
    }

    #[test]
    fn test_analyze_requires_text() {
        assert!(Cli::try_parse_from(["mhc", "analyze"]).is_err());
    }

    #[test]
    fn test_theme_value_is_optional() {
        let cli = Cli::parse_from(["mhc", "theme"]);
        assert!(matches!(cli.command, Some(Commands::Theme { value: None })));

        let cli = Cli::parse_from(["mhc", "theme", "toggle"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Theme {
                value: Some(ThemeArg::Toggle)
            })
        ));
    }
}
