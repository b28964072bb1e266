//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::{Parser, ValueEnum};
use mhc_core::ChatEndpoint;

use crate::commands::Commands;

/// Which backend endpoint messages go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// `POST /analyze`, the web client's flow
    Analyze,
    /// `POST /chat`, the mobile client's flow
    Chat,
}

impl From<ModeArg> for ChatEndpoint {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Analyze => Self::Analyze,
            ModeArg::Chat => Self::Chat,
        }
    }
}

/// Command-line interface for the MH Companion client.
///
/// Global options override the saved settings for one invocation.
#[derive(Parser)]
#[command(name = "mhc")]
#[command(about = "Talk to the MH Companion backend from the terminal")]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides the saved setting)
    #[arg(long = "api-url", env = "MHC_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long = "timeout-secs", default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    /// Backend endpoint to send messages to (overrides the saved setting)
    #[arg(long = "mode", value_enum, global = true)]
    pub mode: Option<ModeArg>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
