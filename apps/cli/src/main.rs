//! dealscope CLI — company-research enrichment tool.
//!
//! Scrapes a company's website, runs LLM investment analysis, and caches
//! the resulting enrichment records on disk.

mod cache;
mod commands;

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
