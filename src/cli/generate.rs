use anyhow::{Context, Result};
use clap::Args;
use keyfill_password_gen::{generate, GeneratorPolicy};
use serde::Serialize;

use super::context::CliContext;
use super::output::emit;

#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    /// Password length (defaults to the configured policy)
    #[arg(short = 'n', long)]
    pub length: Option<usize>,

    /// Leave digits out
    #[arg(long)]
    pub no_numbers: bool,

    /// Leave symbols out
    #[arg(long)]
    pub no_symbols: bool,

    /// How many passwords to print
    #[arg(long, default_value_t = 1)]
    pub count: usize,
}

#[derive(Serialize)]
struct GenerateOutput {
    policy: GeneratorPolicy,
    passwords: Vec<String>,
}

pub fn policy_for(args: &GenerateArgs, base: GeneratorPolicy) -> GeneratorPolicy {
    GeneratorPolicy {
        length: args.length.unwrap_or(base.length),
        include_numbers: base.include_numbers && !args.no_numbers,
        include_symbols: base.include_symbols && !args.no_symbols,
    }
}

pub async fn cmd_generate(args: GenerateArgs, ctx: &CliContext) -> Result<()> {
    let policy = policy_for(&args, ctx.config().generator);
    let passwords = (0..args.count.max(1))
        .map(|_| generate(&policy))
        .collect::<Result<Vec<_>, _>>()
        .context("password generation failed")?;

    let output = GenerateOutput { policy, passwords };
    if !emit(ctx.output(), &output)? {
        for password in &output.passwords {
            println!("{password}");
        }
    }
    Ok(())
}
