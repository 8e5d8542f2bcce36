//! wikicards CLI: turn a topic into a deck of study flashcards.
//!
//! Pulls a few encyclopedia articles for the query, summarizes them with a
//! language model, and writes 20-50 question/answer cards as Markdown.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
