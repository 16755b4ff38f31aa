use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::debug;

use super::context::CliContext;
use super::output::emit;
use crate::fixtures::{read_page, read_records};
use crate::simulate::{run_simulation, PromptChoice, Scenario};

#[derive(Args, Clone, Debug)]
pub struct SimulateArgs {
    /// Page fixture (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub page: PathBuf,

    /// Credential store fixture; the store starts empty without it
    #[arg(long, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Reaction to the autofill prompt
    #[arg(long, value_enum, default_value = "accept")]
    pub prompt: PromptChoice,

    /// Generate a password into the focused field
    #[arg(long)]
    pub generate: bool,

    /// Submit the form with this id at the end
    #[arg(long, value_name = "FORM_ID")]
    pub submit: Option<String>,
}

pub async fn cmd_simulate(args: SimulateArgs, ctx: &CliContext) -> Result<()> {
    let page = read_page(&args.page).await?;
    let records = match &args.store {
        Some(path) => read_records(path).await?,
        None => Vec::new(),
    };
    debug!(
        target: "keyfill",
        config = %ctx.config_path().display(),
        records = records.len(),
        "starting simulation"
    );

    let scenario = Scenario {
        page,
        records,
        prompt: args.prompt,
        generate: args.generate,
        submit: args.submit,
    };
    let report = run_simulation(ctx.config(), scenario).await?;
    if emit(ctx.output(), &report)? {
        return Ok(());
    }

    let path: Vec<String> = report.states.iter().map(ToString::to_string).collect();
    println!("Final state: {}", report.final_state);
    println!("Transitions: {}", path.join(" -> "));
    println!("Prompt shown: {}", report.prompt_shown);
    if let Some(fill) = &report.fill {
        println!(
            "Filled form {} (username: {}, password: {})",
            fill.form, fill.outcome.username_filled, fill.outcome.password_filled
        );
    }
    if let Some(element) = &report.generated {
        println!("Generated password written to {element}");
    }
    if report.captured {
        println!("Submitted credentials captured");
    }
    println!("Stored records: {}", report.stored_records);
    Ok(())
}
