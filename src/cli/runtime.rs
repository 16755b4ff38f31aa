use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn, Subscriber};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use super::output::LogFormat;
use crate::config::{default_config_path, AppConfig};
use crate::errors::ConfigError;

pub fn init_logging(level: &str, debug: bool, format: LogFormat) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string())),
        )
        .with(log_layer(format, std::io::stderr))
        .init();

    Ok(())
}

fn log_layer<S, W>(format: LogFormat, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Human => fmt::layer().with_writer(writer).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
}

/// Read the config file (defaults when it does not exist), then apply `KEYFILL_*` overrides.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path().context("Failed to get config directory")?,
    };

    let mut config = if fs::try_exists(&config_path).await.unwrap_or(false) {
        let content = fs::read_to_string(&config_path)
            .await
            .map_err(|source| ConfigError::Read {
                path: config_path.clone(),
                source,
            })?;
        let config = AppConfig::from_yaml_str(&content, &config_path)?;
        info!(target: "keyfill", "Loaded configuration from: {}", config_path.display());
        config
    } else {
        warn!(
            target: "keyfill",
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        AppConfig::default()
    };

    config.apply_env_overrides(env::vars())?;
    config.validate()?;
    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}
