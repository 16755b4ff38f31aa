use anyhow::Result;

use super::commands::Commands;
use super::context::CliContext;
use super::detect::cmd_detect;
use super::env::CliArgs;
use super::generate::cmd_generate;
use super::matching::cmd_match;
use super::simulate::cmd_simulate;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Generate(args) => cmd_generate(args, ctx).await,
        Commands::Match(args) => cmd_match(args, ctx).await,
        Commands::Detect(args) => cmd_detect(args, ctx).await,
        Commands::Simulate(args) => cmd_simulate(args, ctx).await,
    }
}
