//! Search Engine Fallback
//!
//! Routes each query through an ordered chain of backends:
//! - `SearchEngine` trait for pluggable backends
//! - Per-engine cooldown after a failure or timeout
//! - Automatic failover to the next engine by priority
//! - Per-engine statistics and descriptor snapshots
//!
//! Backend failures never reach the caller. When every engine is down the
//! coordinator returns an empty result set served by [`NO_ENGINE`].

mod builder;
mod config;
mod error;
mod health;
mod provider;
mod stats;


// Re-export public API
pub use builder::FallbackCoordinatorBuilder;
pub use config::FallbackConfig;
pub use error::{EngineError, Result};
pub use health::{CooldownBreaker, EngineDescriptor, EngineState};
pub use provider::SearchEngine;
pub use stats::EngineStats;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{timeout, Instant};

use crate::core::search::models::{EngineQuery, SearchResult};

/// `used_engine` value when no engine produced the results
pub const NO_ENGINE: &str = "none";

// ============================================================================
// Outcome Types
// ============================================================================

/// What happened to one engine during a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum AttemptOutcome {
    Succeeded,
    Failed(String),
    TimedOut,
    /// Engine was cooling down and not invoked
    Skipped,
}

/// One entry in the per-request attempt log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineAttempt {
    pub engine: String,
    pub outcome: AttemptOutcome,
    pub latency_ms: u64,
}

/// Result of running a query through the chain
#[derive(Debug, Clone)]
pub struct FallbackOutcome {
    pub results: Vec<SearchResult>,
    /// Engine that produced `results`, or [`NO_ENGINE`]
    pub used_engine: String,
    pub attempts: Vec<EngineAttempt>,
}

impl FallbackOutcome {
    /// True when no engine answered
    pub fn is_exhausted(&self) -> bool {
        self.used_engine == NO_ENGINE
    }
}

// ============================================================================
// Fallback Coordinator
// ============================================================================

struct EngineSlot {
    engine: Arc<dyn SearchEngine>,
    priority: i32,
    health: RwLock<CooldownBreaker>,
    stats: RwLock<EngineStats>,
}

/// Ordered engine registry with failover
pub struct FallbackCoordinator {
    /// Sorted by ascending priority, then registration order
    slots: Vec<EngineSlot>,
    config: FallbackConfig,
}

impl FallbackCoordinator {
    fn new(config: FallbackConfig, engines: Vec<(Arc<dyn SearchEngine>, i32)>) -> Self {
        let mut slots: Vec<EngineSlot> = engines
            .into_iter()
            .map(|(engine, priority)| EngineSlot {
                engine,
                priority,
                health: RwLock::new(CooldownBreaker::new(config.cooldown())),
                stats: RwLock::new(EngineStats::default()),
            })
            .collect();
        // Stable sort keeps registration order among equal priorities
        slots.sort_by_key(|slot| slot.priority);

        Self { slots, config }
    }

    pub fn builder() -> FallbackCoordinatorBuilder {
        FallbackCoordinatorBuilder::new()
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    /// Engine names in the order they are tried
    pub fn engine_names(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|slot| slot.engine.name().to_string())
            .collect()
    }

    /// Run a query against the first available engine that answers.
    ///
    /// Engines are tried strictly in priority order. Cooling-down engines are
    /// skipped; an engine that errors or exceeds the timeout is put into
    /// cooldown and the next one is tried. Never fails: exhaustion yields an
    /// empty outcome served by [`NO_ENGINE`].
    pub async fn execute(&self, query: &EngineQuery) -> FallbackOutcome {
        let mut attempts = Vec::with_capacity(self.slots.len());
        let engine_timeout = self.config.engine_timeout();

        for slot in &self.slots {
            let name = slot.engine.name();

            if !slot.health.read().await.can_execute() {
                log::debug!("Skipping engine {} (cooling down)", name);
                slot.stats.write().await.record_skip();
                attempts.push(EngineAttempt {
                    engine: name.to_string(),
                    outcome: AttemptOutcome::Skipped,
                    latency_ms: 0,
                });
                continue;
            }

            let start = Instant::now();
            let result = timeout(engine_timeout, slot.engine.search(query)).await;
            let latency_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(Ok(results)) => {
                    slot.health.write().await.record_success();
                    slot.stats.write().await.record_success(latency_ms);
                    log::info!(
                        "Search served by engine {} ({} results, {}ms)",
                        name,
                        results.len(),
                        latency_ms
                    );
                    attempts.push(EngineAttempt {
                        engine: name.to_string(),
                        outcome: AttemptOutcome::Succeeded,
                        latency_ms,
                    });
                    return FallbackOutcome {
                        results,
                        used_engine: name.to_string(),
                        attempts,
                    };
                }
                Ok(Err(e)) => {
                    let reason = e.to_string();
                    slot.health.write().await.record_failure(&reason);
                    slot.stats.write().await.record_failure();
                    log::warn!(
                        "Engine {} failed, cooling down for {:?}: {}",
                        name,
                        self.config.cooldown(),
                        e
                    );
                    attempts.push(EngineAttempt {
                        engine: name.to_string(),
                        outcome: AttemptOutcome::Failed(reason),
                        latency_ms,
                    });
                }
                Err(_) => {
                    let reason = EngineError::Timeout(engine_timeout).to_string();
                    slot.health.write().await.record_failure(&reason);
                    slot.stats.write().await.record_timeout();
                    log::warn!(
                        "Engine {} timed out after {:?}, cooling down",
                        name,
                        engine_timeout
                    );
                    attempts.push(EngineAttempt {
                        engine: name.to_string(),
                        outcome: AttemptOutcome::TimedOut,
                        latency_ms,
                    });
                }
            }
        }

        log::warn!(
            "All {} search engines unavailable, returning empty results",
            self.slots.len()
        );
        FallbackOutcome {
            results: Vec::new(),
            used_engine: NO_ENGINE.to_string(),
            attempts,
        }
    }

    /// Snapshot of every engine, in priority order
    pub async fn descriptors(&self) -> Vec<EngineDescriptor> {
        let mut descriptors = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let health = slot.health.read().await;
            descriptors.push(EngineDescriptor::snapshot(
                slot.engine.name(),
                slot.priority,
                &health,
            ));
        }
        descriptors
    }

    pub async fn engine_state(&self, name: &str) -> Option<EngineState> {
        let slot = self.slot(name)?;
        let state = slot.health.read().await.state();
        Some(state)
    }

    pub async fn stats(&self, name: &str) -> Option<EngineStats> {
        let slot = self.slot(name)?;
        let stats = slot.stats.read().await.clone();
        Some(stats)
    }

    /// Names of engines that are not cooling down, in priority order
    pub async fn available_engines(&self) -> Vec<String> {
        let mut available = Vec::new();
        for slot in &self.slots {
            if slot.health.read().await.can_execute() {
                available.push(slot.engine.name().to_string());
            }
        }
        available
    }

    /// End an engine's cooldown early
    pub async fn reset_engine(&self, name: &str) -> Result<()> {
        let slot = self
            .slot(name)
            .ok_or_else(|| EngineError::UnknownEngine(name.to_string()))?;
        slot.health.write().await.reset();
        log::info!("Engine {} reset to available", name);
        Ok(())
    }

    fn slot(&self, name: &str) -> Option<&EngineSlot> {
        self.slots.iter().find(|slot| slot.engine.name() == name)
    }
}
