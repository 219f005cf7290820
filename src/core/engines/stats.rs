//! Engine Statistics
//!
//! Tracks usage statistics for each registered engine.

use serde::{Deserialize, Serialize};

/// Statistics for a single engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Calls actually made to the engine
    pub total_requests: u64,
    pub successful_requests: u64,
    /// Calls that returned an error (timeouts counted separately)
    pub failed_requests: u64,
    pub timeouts: u64,
    /// Requests that passed over this engine while it was cooling down
    pub skipped_requests: u64,
    pub total_latency_ms: u64,
}

impl EngineStats {
    pub fn avg_latency_ms(&self) -> u64 {
        if self.successful_requests == 0 {
            0
        } else {
            self.total_latency_ms / self.successful_requests
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            1.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }

    pub fn record_success(&mut self, latency_ms: u64) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.total_latency_ms += latency_ms;
    }

    pub fn record_failure(&mut self) {
        self.total_requests += 1;
        self.failed_requests += 1;
    }

    pub fn record_timeout(&mut self) {
        self.total_requests += 1;
        self.timeouts += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped_requests += 1;
    }
}
