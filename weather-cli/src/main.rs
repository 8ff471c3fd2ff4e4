//! Binary crate for the `weather` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and search
//! - Human-friendly output formatting

use clap::Parser;

mod cli;
mod logging;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
