//! Fallback Coordinator Builder
//!
//! Builder pattern for constructing a FallbackCoordinator.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::config::FallbackConfig;
use super::error::{EngineError, Result};
use super::provider::SearchEngine;
use super::FallbackCoordinator;

/// Builder for constructing a FallbackCoordinator
pub struct FallbackCoordinatorBuilder {
    config: FallbackConfig,
    engines: Vec<(Arc<dyn SearchEngine>, i32)>,
}

impl FallbackCoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            config: FallbackConfig::default(),
            engines: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: FallbackConfig) -> Self {
        self.config = config;
        self
    }

    /// Register an engine. Lower priority values are tried first; equal
    /// priorities keep registration order.
    pub fn add_engine(mut self, engine: Arc<dyn SearchEngine>, priority: i32) -> Self {
        self.engines.push((engine, priority));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.engine_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.config.cooldown_ms = cooldown.as_millis() as u64;
        self
    }

    /// Fix the priority order. Fails if two engines share a name.
    pub fn build(self) -> Result<FallbackCoordinator> {
        let mut seen = HashSet::new();
        for (engine, _) in &self.engines {
            if !seen.insert(engine.name().to_string()) {
                return Err(EngineError::DuplicateEngine(engine.name().to_string()));
            }
        }

        Ok(FallbackCoordinator::new(self.config, self.engines))
    }
}

impl Default for FallbackCoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
