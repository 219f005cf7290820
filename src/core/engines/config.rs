//! Fallback Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the fallback coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Upper bound on a single engine call, in milliseconds
    pub engine_timeout_ms: u64,
    /// How long a failed engine is skipped, in milliseconds
    pub cooldown_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            engine_timeout_ms: 5_000,
            cooldown_ms: 300_000,
        }
    }
}

impl FallbackConfig {
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_millis(self.engine_timeout_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}
