//! Runtime configuration for the keyfill binary.
//!
//! Loaded from YAML, then overridden by `KEYFILL_*` environment variables. Durations are
//! written in humantime form (`"10s"`, `"750ms"`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use extensions_bridge::BridgeConfig;
use keyfill_page_agent::PageAgentConfig;
use keyfill_password_gen::GeneratorPolicy;
use keyfill_vault_agent::Settings;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const ENV_AUTO_FILL: &str = "KEYFILL_AUTO_FILL";
pub const ENV_AUTO_SAVE: &str = "KEYFILL_AUTO_SAVE";
pub const ENV_PROMPT_TIMEOUT: &str = "KEYFILL_PROMPT_TIMEOUT";
pub const ENV_REQUEST_TIMEOUT: &str = "KEYFILL_REQUEST_TIMEOUT";

const CONFIG_DIR: &str = "keyfill";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub settings: Settings,
    pub bridge: BridgeSection,
    pub page: PageSection,
    pub generator: GeneratorPolicy,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSection {
    #[serde(with = "duration_str")]
    pub request_timeout: Duration,
    pub queue_capacity: usize,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            queue_capacity: 64,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSection {
    #[serde(with = "duration_str")]
    pub prompt_timeout: Duration,
}

impl Default for PageSection {
    fn default() -> Self {
        Self {
            prompt_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    pub fn from_yaml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Apply `KEYFILL_*` overrides from `vars`. Unrelated keys are ignored.
    pub fn apply_env_overrides<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            match key {
                ENV_AUTO_FILL => self.settings.auto_fill = parse_flag(key, value)?,
                ENV_AUTO_SAVE => self.settings.auto_save = parse_flag(key, value)?,
                ENV_PROMPT_TIMEOUT => self.page.prompt_timeout = parse_duration(key, value)?,
                ENV_REQUEST_TIMEOUT => {
                    self.bridge.request_timeout = parse_duration(key, value)?
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("generator: {err}")))?;
        if self.bridge.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "bridge.request_timeout must be positive".into(),
            ));
        }
        if self.page.prompt_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "page.prompt_timeout must be positive".into(),
            ));
        }
        if self.bridge.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "bridge.queue_capacity must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig {
            request_timeout_ms: millis(self.bridge.request_timeout),
            queue_capacity: self.bridge.queue_capacity,
        }
    }

    pub fn page_config(&self) -> PageAgentConfig {
        PageAgentConfig {
            prompt_timeout_ms: millis(self.page.prompt_timeout),
            ..PageAgentConfig::default()
        }
    }
}

/// `<config dir>/keyfill/config.yaml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    Ok(path)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn parse_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|err| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
        reason: err.to_string(),
    })
}

mod duration_str {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let raw = "settings:\n  autoSave: false\npage:\n  prompt_timeout: 3s\n";
        let config = AppConfig::from_yaml_str(raw, Path::new("inline.yaml")).unwrap();
        assert!(config.settings.auto_fill);
        assert!(!config.settings.auto_save);
        assert_eq!(config.page.prompt_timeout, Duration::from_secs(3));
        assert_eq!(config.bridge, BridgeSection::default());
        assert_eq!(config.generator, GeneratorPolicy::default());
    }

    #[test]
    fn env_overrides_win() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides([
                (ENV_AUTO_FILL, "off"),
                (ENV_REQUEST_TIMEOUT, "750ms"),
                ("HOME", "/root"),
            ])
            .unwrap();
        assert!(!config.settings.auto_fill);
        assert_eq!(config.bridge_config().request_timeout_ms, 750);
    }

    #[test]
    fn bad_env_values_are_reported() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides([(ENV_PROMPT_TIMEOUT, "soon")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref key, .. } if key == ENV_PROMPT_TIMEOUT));
    }

    #[test]
    fn validation_rejects_oversized_generator_policy() {
        let mut config = AppConfig::default();
        config.generator.length = 4096;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.generator.length = 24;
        config.page.prompt_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
