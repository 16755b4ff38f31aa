//! Channel configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Upper bound on waiting for a reply before the request counts as unanswered.
    pub request_timeout_ms: u64,
    pub queue_capacity: usize,
}

impl BridgeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 5_000,
            queue_capacity: 64,
        }
    }
}
