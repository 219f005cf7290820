//! Engine Health Tracking
//!
//! Cooldown state machine for a single engine. An engine is either
//! `Available` or `CoolingDown` until a deadline; the deadline is the only
//! state, so expiry needs no timer and a stale failure can never shorten a
//! newer one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Cooldown State Machine
// ============================================================================

/// Availability of an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Requests allowed
    #[default]
    Available,
    /// Engine failed recently and is skipped
    CoolingDown,
}

/// Tracks failures of one engine and when it may be used again
#[derive(Debug, Clone)]
pub struct CooldownBreaker {
    cooldown: Duration,
    cooldown_until: Option<Instant>,
    last_failure: Option<DateTime<Utc>>,
    last_failure_reason: Option<String>,
    consecutive_failures: u32,
}

impl CooldownBreaker {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            cooldown_until: None,
            last_failure: None,
            last_failure_reason: None,
            consecutive_failures: 0,
        }
    }

    /// Whether the engine may be invoked now
    pub fn can_execute(&self) -> bool {
        self.cooldown_until
            .map_or(true, |until| Instant::now() >= until)
    }

    pub fn state(&self) -> EngineState {
        if self.can_execute() {
            EngineState::Available
        } else {
            EngineState::CoolingDown
        }
    }

    /// Record a successful call.
    ///
    /// Leaves any cooldown deadline alone: a success that raced with a newer
    /// failure must not re-enable the engine.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Record a failed call and start (or extend) the cooldown window.
    ///
    /// The deadline only ever moves forward.
    pub fn record_failure(&mut self, reason: &str) {
        let until = Instant::now() + self.cooldown;
        self.cooldown_until = Some(match self.cooldown_until {
            Some(existing) if existing > until => existing,
            _ => until,
        });
        self.last_failure = Some(Utc::now());
        self.last_failure_reason = Some(reason.to_string());
        self.consecutive_failures += 1;
    }

    /// Return to `Available` immediately
    pub fn reset(&mut self) {
        self.cooldown_until = None;
        self.consecutive_failures = 0;
    }

    /// Time left in the current cooldown window, if any
    pub fn remaining(&self) -> Option<Duration> {
        let until = self.cooldown_until?;
        let now = Instant::now();
        (until > now).then(|| until - now)
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_failure(&self) -> Option<DateTime<Utc>> {
        self.last_failure
    }

    pub fn last_failure_reason(&self) -> Option<&str> {
        self.last_failure_reason.as_deref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

// ============================================================================
// Engine Descriptor
// ============================================================================

/// Point-in-time view of a registered engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineDescriptor {
    pub name: String,
    pub priority: i32,
    pub state: EngineState,
    pub last_failure: Option<DateTime<Utc>>,
    pub last_failure_reason: Option<String>,
    pub consecutive_failures: u32,
    pub cooldown_ms: u64,
    /// Seconds until the engine is available again; zero when available
    pub cooldown_remaining_secs: u64,
}

impl EngineDescriptor {
    pub(crate) fn snapshot(name: &str, priority: i32, breaker: &CooldownBreaker) -> Self {
        Self {
            name: name.to_string(),
            priority,
            state: breaker.state(),
            last_failure: breaker.last_failure(),
            last_failure_reason: breaker.last_failure_reason().map(str::to_string),
            consecutive_failures: breaker.consecutive_failures(),
            cooldown_ms: breaker.cooldown().as_millis() as u64,
            cooldown_remaining_secs: breaker
                .remaining()
                .map(|d| d.as_secs_f64().ceil() as u64)
                .unwrap_or(0),
        }
    }

    pub fn is_available(&self) -> bool {
        self.state == EngineState::Available
    }
}
