//! Environment-driven configuration

use clap::{Parser, ValueEnum};

/// Session settings read at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Start with prompt submission disabled
    pub low_bandwidth: bool,
}

impl EngineConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            low_bandwidth: std::env::var("CHAT_TURN_LOW_BANDWIDTH")
                .ok()
                .is_some_and(|v| parse_flag(&v)),
        }
    }
}

/// Output of the `chat-format` binary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Rendered HTML fragment
    #[default]
    Html,
    /// Block structure as pretty-printed JSON
    Json,
}

/// chat-format - render a bot reply read from stdin
#[derive(Debug, Parser)]
#[command(name = "chat-format")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(
        long,
        value_enum,
        env = "CHAT_TURN_OUTPUT",
        ignore_case = true,
        default_value_t = OutputFormat::Html
    )]
    pub output: OutputFormat,
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
