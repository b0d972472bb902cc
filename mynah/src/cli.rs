//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use eyre::Result;

#[derive(Debug, Parser)]
#[command(name = "mynah")]
#[command(about = "ASR evaluation: WER and RTFX over labeled speech datasets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Evaluate a model over a dataset split
    Run(crate::run::Args),

    /// Recompute WER from an existing results manifest
    Score(crate::score::Args),
}

/// Execute CLI command - separated for testing.
pub fn run(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Run(args) => crate::run::execute(args.try_into()?),
        Commands::Score(args) => crate::score::execute(args.try_into()?),
    }
}
