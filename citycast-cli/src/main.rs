//! Binary crate for the `citycast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive credential configuration
//! - The chart view and plain table output

use clap::Parser;

mod cli;
mod tui;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // logs go to stderr so they never land inside the chart view
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
