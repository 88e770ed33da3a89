use super::classify::cmd_classify;
use super::env::CliArgs;
use super::inspect::cmd_context;
use super::patterns::cmd_patterns;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Classify(args) => cmd_classify(args, ctx, cli.output.clone()).await,
        Commands::Context(args) => cmd_context(args, ctx, cli.output.clone()).await,
        Commands::Patterns(args) => cmd_patterns(args, ctx, cli.output.clone()).await,
    }
}
