//! chat-format - render a bot reply from stdin
//!
//! Prints the formatted blocks as HTML (default) or JSON, chosen with
//! `--output` or `CHAT_TURN_OUTPUT`.

use chat_turn::{format_message, to_html, Cli, OutputFormat};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout carries the rendered output
    let json_logs = std::env::var_os("CHAT_TURN_LOG_JSON").is_some();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("CHAT_TURN_LOG")
                .unwrap_or_else(|_| "chat_turn=info".into()),
        )
        .with(json_logs.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr)
        }))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let output = Cli::parse().output;

    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let text = input
        .strip_suffix('\n')
        .map_or(input.as_str(), |s| s.strip_suffix('\r').unwrap_or(s));

    let blocks = format_message(text);
    tracing::debug!(?output, blocks = blocks.len(), "Formatted message");

    match output {
        OutputFormat::Html => print!("{}", to_html(&blocks)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&blocks)?),
    }
    Ok(())
}
