//! besluit-publicatie publisher — extracts published meeting records into
//! the shared triple store.
//!
//! Triggered over HTTP (`POST /publish-tasks`) or by the built-in poll
//! scheduler; a single worker drains the queue so batches never overlap.

mod commands;
mod http;
mod service;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
