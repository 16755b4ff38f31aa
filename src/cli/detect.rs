use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use keyfill_form_detector::{detect_forms, DetectedForm, StaticDocument};
use serde::Serialize;

use super::context::CliContext;
use super::output::emit;
use crate::fixtures::read_page;

#[derive(Args, Clone, Debug)]
pub struct DetectArgs {
    /// Page fixture (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub page: PathBuf,
}

#[derive(Serialize)]
struct DetectOutput {
    url: String,
    forms: Vec<DetectedForm>,
}

pub async fn cmd_detect(args: DetectArgs, ctx: &CliContext) -> Result<()> {
    let fixture = read_page(&args.page).await?;
    let url = fixture.url.clone();
    let document = StaticDocument::from_fixture(fixture).context("invalid page fixture")?;
    let forms = detect_forms(&document).await?;

    let output = DetectOutput { url, forms };
    if emit(ctx.output(), &output)? {
        return Ok(());
    }

    if output.forms.is_empty() {
        println!("No login forms on {}", output.url);
        return Ok(());
    }
    println!("Login forms on {}:", output.url);
    for form in &output.forms {
        let username = form
            .username_field
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}: username={} password={}",
            form.form, username, form.password_field
        );
    }
    Ok(())
}
