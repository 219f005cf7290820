//! Search Analytics
//!
//! Fire-and-forget recording of completed searches. The orchestrator hands
//! each event to a sink on a spawned task, so a slow or broken sink never
//! delays a response.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::engines::NO_ENGINE;

/// Events kept by [`InMemoryAnalytics`] before the oldest are dropped
const DEFAULT_MAX_EVENTS: usize = 10_000;

// ============================================================================
// Types
// ============================================================================

/// One completed search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEvent {
    /// Unique event ID
    pub id: String,
    /// Normalized query text as submitted
    pub query: String,
    /// Text actually sent to the engines (after correction)
    pub executed_query: String,
    pub used_engine: String,
    /// Size of the full match set
    pub result_count: usize,
    pub cache_hit: bool,
    /// Number of tokens the correction stage rewrote
    pub corrections: usize,
    pub correction_confidence: f64,
    /// Engines that failed or timed out on the way to `used_engine`
    pub failed_engines: Vec<String>,
    pub execution_time_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl SearchEvent {
    pub fn new(query: impl Into<String>, used_engine: impl Into<String>, result_count: usize) -> Self {
        let query = query.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            executed_query: query.clone(),
            query,
            used_engine: used_engine.into(),
            result_count,
            cache_hit: false,
            corrections: 0,
            correction_confidence: 1.0,
            failed_engines: Vec::new(),
            execution_time_ms: 0,
            timestamp: Utc::now(),
        }
    }

    /// Mark as served from cache
    pub fn with_cache_hit(mut self, cache_hit: bool) -> Self {
        self.cache_hit = cache_hit;
        self
    }

    pub fn with_correction(mut self, executed_query: impl Into<String>, corrections: usize, confidence: f64) -> Self {
        self.executed_query = executed_query.into();
        self.corrections = corrections;
        self.correction_confidence = confidence;
        self
    }

    pub fn with_failed_engines(mut self, engines: Vec<String>) -> Self {
        self.failed_engines = engines;
        self
    }

    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = ms;
        self
    }

    /// Every engine was down
    pub fn is_exhausted(&self) -> bool {
        self.used_engine == NO_ENGINE
    }
}

/// Aggregate view over recorded events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_searches: usize,
    pub cache_hits: usize,
    pub zero_result_searches: usize,
    pub exhausted_searches: usize,
    pub corrected_searches: usize,
    pub avg_execution_time_ms: f64,
    /// Searches served per engine
    pub engine_usage: BTreeMap<String, usize>,
    /// Most frequent queries, most frequent first
    pub top_queries: Vec<(String, usize)>,
}

// ============================================================================
// Sinks
// ============================================================================

/// Destination for search events
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: SearchEvent);
}

/// Emits each event as a structured `tracing` record
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

#[async_trait]
impl AnalyticsSink for TracingAnalytics {
    async fn record(&self, event: SearchEvent) {
        tracing::info!(
            target: "civic_search::analytics",
            event_id = %event.id,
            query = %event.query,
            executed_query = %event.executed_query,
            used_engine = %event.used_engine,
            result_count = event.result_count,
            cache_hit = event.cache_hit,
            corrections = event.corrections,
            correction_confidence = event.correction_confidence,
            failed_engines = ?event.failed_engines,
            execution_time_ms = event.execution_time_ms,
            "search completed"
        );
    }
}

/// Bounded in-memory event log
pub struct InMemoryAnalytics {
    events: RwLock<Vec<SearchEvent>>,
    max_events: usize,
}

impl InMemoryAnalytics {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_EVENTS)
    }

    pub fn with_capacity(max_events: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            max_events: max_events.max(1),
        }
    }

    pub fn push(&self, event: SearchEvent) {
        let mut events = self.events.write().unwrap_or_else(|e| e.into_inner());
        events.push(event);
        if events.len() > self.max_events {
            let excess = events.len() - self.max_events;
            events.drain(..excess);
        }
    }

    /// Snapshot of recorded events, oldest first
    pub fn events(&self) -> Vec<SearchEvent> {
        self.events.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.events.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self, top_n: usize) -> AnalyticsSummary {
        let events = self.events.read().unwrap_or_else(|e| e.into_inner());
        if events.is_empty() {
            return AnalyticsSummary::default();
        }

        let mut engine_usage = BTreeMap::new();
        let mut query_counts: HashMap<&str, usize> = HashMap::new();
        let mut total_time = 0u64;

        for event in events.iter() {
            *engine_usage.entry(event.used_engine.clone()).or_insert(0) += 1;
            *query_counts.entry(event.query.as_str()).or_insert(0) += 1;
            total_time += event.execution_time_ms;
        }

        let mut top_queries: Vec<(String, usize)> = query_counts
            .into_iter()
            .map(|(query, count)| (query.to_string(), count))
            .collect();
        top_queries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_queries.truncate(top_n);

        AnalyticsSummary {
            total_searches: events.len(),
            cache_hits: events.iter().filter(|e| e.cache_hit).count(),
            zero_result_searches: events.iter().filter(|e| e.result_count == 0).count(),
            exhausted_searches: events.iter().filter(|e| e.is_exhausted()).count(),
            corrected_searches: events.iter().filter(|e| e.corrections > 0).count(),
            avg_execution_time_ms: total_time as f64 / events.len() as f64,
            engine_usage,
            top_queries,
        }
    }

    pub fn clear(&self) {
        self.events.write().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Default for InMemoryAnalytics {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalyticsSink for InMemoryAnalytics {
    async fn record(&self, event: SearchEvent) {
        self.push(event);
    }
}

/// Hand an event to a sink without waiting for it.
///
/// Outside a Tokio runtime the event is dropped with a debug log.
pub fn dispatch(sink: Arc<dyn AnalyticsSink>, event: SearchEvent) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                sink.record(event).await;
            });
        }
        Err(_) => {
            log::debug!("No runtime for analytics, dropping event {}", event.id);
        }
    }
}
