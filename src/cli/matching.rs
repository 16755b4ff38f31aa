use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use keyfill_credential_matcher::{find_matching, normalize_origin, CredentialRecord};
use serde::Serialize;
use tracing::info;

use super::context::CliContext;
use super::output::emit;
use crate::fixtures::read_records;

#[derive(Args, Clone, Debug)]
pub struct MatchArgs {
    /// Page URL to match against
    #[arg(long)]
    pub url: String,

    /// Credential store fixture (YAML or JSON list of records)
    #[arg(long, value_name = "FILE")]
    pub store: PathBuf,

    /// Print secrets instead of masking them
    #[arg(long)]
    pub show_secrets: bool,
}

#[derive(Serialize)]
struct MatchRow {
    origin: String,
    username: String,
    secret: String,
}

#[derive(Serialize)]
struct MatchOutput {
    origin: String,
    matches: Vec<MatchRow>,
}

fn row(record: CredentialRecord, show_secret: bool) -> MatchRow {
    let secret = if show_secret {
        record.secret
    } else {
        "*".repeat(8)
    };
    MatchRow {
        origin: record.origin,
        username: record.username,
        secret,
    }
}

pub async fn cmd_match(args: MatchArgs, ctx: &CliContext) -> Result<()> {
    let origin = normalize_origin(&args.url).context("URL has no usable origin")?;
    let records = read_records(&args.store).await?;
    let matches = find_matching(&origin, &records);
    info!(
        target: "keyfill",
        %origin,
        candidates = records.len(),
        matched = matches.len(),
        "matched credential store"
    );

    let output = MatchOutput {
        origin,
        matches: matches
            .into_iter()
            .map(|record| row(record, args.show_secrets))
            .collect(),
    };
    if emit(ctx.output(), &output)? {
        return Ok(());
    }

    if output.matches.is_empty() {
        println!("No credentials for {}", output.origin);
        return Ok(());
    }
    println!("Credentials for {}:", output.origin);
    for item in &output.matches {
        let username = if item.username.is_empty() {
            "<no username>"
        } else {
            item.username.as_str()
        };
        println!("  {username}  {}", item.secret);
    }
    Ok(())
}
