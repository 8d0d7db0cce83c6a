//! Binary crate for the `weatherboard` command-line dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and country pickers
//! - Rendering the dashboard views in the terminal

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod prompt;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so they never interleave with the rendered views.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
