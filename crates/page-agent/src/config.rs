use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageAgentConfig {
    /// How long the autofill prompt stays up without user action.
    pub prompt_timeout_ms: u64,
    pub event_capacity: usize,
}

impl PageAgentConfig {
    pub fn prompt_timeout(&self) -> Duration {
        Duration::from_millis(self.prompt_timeout_ms)
    }
}

impl Default for PageAgentConfig {
    fn default() -> Self {
        Self {
            prompt_timeout_ms: 10_000,
            event_capacity: 64,
        }
    }
}
