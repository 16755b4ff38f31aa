//! Fixture files consumed by the CLI: page documents and credential stores.
//!
//! Both are read as YAML, which also accepts JSON.

use std::path::Path;

use anyhow::{Context, Result};
use keyfill_credential_matcher::CredentialRecord;
use keyfill_form_detector::DocumentFixture;

pub async fn read_page(path: &Path) -> Result<DocumentFixture> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read page fixture {}", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse page fixture {}", path.display()))
}

pub async fn read_records(path: &Path) -> Result<Vec<CredentialRecord>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read credential store {}", path.display()))?;
    serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse credential store {}", path.display()))
}
