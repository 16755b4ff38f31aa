use async_trait::async_trait;
use keyfill_credential_matcher::StoreError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Per-installation preferences. The agents only ever read them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub auto_fill: bool,
    pub auto_save: bool,
    /// Minutes of inactivity before the vault locks.
    pub lock_timeout: u32,
    pub notifications_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_fill: true,
            auto_save: true,
            lock_timeout: 5,
            notifications_enabled: true,
        }
    }
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings, StoreError>;
}

/// Settings held in memory, replaceable by the embedding application.
#[derive(Default)]
pub struct StaticSettings {
    inner: RwLock<Settings>,
}

impl StaticSettings {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    pub fn replace(&self, settings: Settings) {
        *self.inner.write() = settings;
    }
}

#[async_trait]
impl SettingsStore for StaticSettings {
    async fn load(&self) -> Result<Settings, StoreError> {
        Ok(self.inner.read().clone())
    }
}
