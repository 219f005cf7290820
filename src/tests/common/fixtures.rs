//! Test Fixtures
//!
//! Scripted engines, result builders and orchestrator assembly.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::engines::{EngineError, FallbackConfig, SearchEngine};
use crate::core::search::{
    EngineQuery, InMemoryAnalytics, ResultType, SearchOrchestrator, SearchOrchestratorBuilder,
    SearchResult,
};

// =============================================================================
// Scripted Engine
// =============================================================================

/// What a [`ScriptedEngine`] does when called
#[derive(Debug, Clone)]
pub enum Script {
    Results(Vec<SearchResult>),
    Fail(String),
    /// Never answers within any sane timeout
    Hang,
}

/// Engine whose behavior can be switched between calls
pub struct ScriptedEngine {
    name: String,
    script: Mutex<Script>,
    calls: AtomicU32,
    last_query: Mutex<Option<EngineQuery>>,
}

impl ScriptedEngine {
    pub fn new(name: &str, script: Script) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            script: Mutex::new(script),
            calls: AtomicU32::new(0),
            last_query: Mutex::new(None),
        })
    }

    pub fn succeeding(name: &str, results: Vec<SearchResult>) -> Arc<Self> {
        Self::new(name, Script::Results(results))
    }

    pub fn failing(name: &str) -> Arc<Self> {
        Self::new(name, Script::Fail(format!("{} unavailable", name)))
    }

    pub fn hanging(name: &str) -> Arc<Self> {
        Self::new(name, Script::Hang)
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<EngineQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchEngine for ScriptedEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query: &EngineQuery) -> Result<Vec<SearchResult>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.clone());

        let script = self.script.lock().unwrap().clone();
        match script {
            Script::Results(results) => Ok(results),
            Script::Fail(reason) => Err(EngineError::Backend(reason)),
            Script::Hang => {
                tokio::time::sleep(Duration::from_secs(3_600)).await;
                Ok(Vec::new())
            }
        }
    }
}

// =============================================================================
// Result Fixtures
// =============================================================================

/// A bill with status, category and date metadata
pub fn bill(id: &str, title: &str, status: &str) -> SearchResult {
    SearchResult::new(id, ResultType::Bill, title, 1.0)
        .with_metadata("status", status)
        .with_metadata("category", "health")
        .with_metadata("chamber", "senate")
        .with_metadata("date", "2024-03-01")
}

pub fn comment(id: &str, title: &str) -> SearchResult {
    SearchResult::new(id, ResultType::Comment, title, 0.5)
}

pub fn sponsor(id: &str, name: &str) -> SearchResult {
    SearchResult::new(id, ResultType::Sponsor, name, 0.25).with_metadata("chamber", "house")
}

/// Mixed result set of the given size, cycling through result types
pub fn mixed_results(count: usize) -> Vec<SearchResult> {
    (0..count)
        .map(|i| match i % 3 {
            0 => bill(&format!("b{}", i), "Budget Act", if i % 2 == 0 { "passed" } else { "introduced" }),
            1 => comment(&format!("c{}", i), "Budget testimony"),
            _ => sponsor(&format!("s{}", i), "Budget sponsor"),
        })
        .collect()
}

// =============================================================================
// Orchestrator Fixtures
// =============================================================================

/// Register engines in order (priority = position) with a short timeout
pub fn builder_with(engines: &[Arc<ScriptedEngine>]) -> SearchOrchestratorBuilder {
    engines
        .iter()
        .enumerate()
        .fold(SearchOrchestrator::builder(), |builder, (i, engine)| {
            builder.add_engine(engine.clone(), i as i32 + 1)
        })
        .with_fallback_config(FallbackConfig {
            engine_timeout_ms: 1_000,
            cooldown_ms: 300_000,
        })
}

/// Orchestrator over the given engines, recording analytics in memory
pub fn orchestrator_with(engines: &[Arc<ScriptedEngine>]) -> (SearchOrchestrator, Arc<InMemoryAnalytics>) {
    let analytics = Arc::new(InMemoryAnalytics::new());
    let orchestrator = builder_with(engines)
        .with_analytics(analytics.clone())
        .build()
        .expect("Failed to build orchestrator");
    (orchestrator, analytics)
}

/// Give spawned analytics tasks a chance to run
pub async fn settle_analytics(analytics: &InMemoryAnalytics, expected: usize) {
    for _ in 0..100 {
        if analytics.len() >= expected {
            return;
        }
        tokio::task::yield_now().await;
    }
}
