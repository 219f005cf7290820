//! Search Orchestrator
//!
//! Composes the stages of a search request:
//!
//! ```text
//! SearchQuery
//!     |
//!     v
//! validate -> normalize -> cache read --hit--> stored response
//!                              |
//!                             miss
//!                              v
//!                  correct -> expand -> fallback chain
//!                                            |
//!                                            v
//!                        facets (full set) -> paginate -> cache write
//! ```
//!
//! Only validation can fail a request. Correction, cache and engine failures
//! degrade the response instead.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::analytics::{dispatch, AnalyticsSink, SearchEvent, TracingAnalytics};
use super::cache::{CacheConfig, CacheStore, MemoryCacheStore, ResultCache};
use super::config::SearchConfig;
use super::error::{Result, SearchError};
use super::facets::FacetAggregator;
use super::models::{EngineQuery, NormalizedQuery, SearchQuery, SearchResponse};
use super::normalizer::QueryNormalizer;
use crate::config::AppConfig;
use crate::core::engines::{AttemptOutcome, FallbackConfig, FallbackCoordinator, FallbackOutcome, SearchEngine};
use crate::core::preprocess::{CorrectionEngine, CorrectionResult, PreprocessConfig};

// ============================================================================
// Orchestrator
// ============================================================================

/// Entry point for search requests.
///
/// Build one per process with [`SearchOrchestrator::builder`] and share it;
/// all state it owns is safe for concurrent use.
pub struct SearchOrchestrator {
    config: SearchConfig,
    normalizer: QueryNormalizer,
    correction: CorrectionEngine,
    coordinator: FallbackCoordinator,
    cache: ResultCache,
    facets: FacetAggregator,
    analytics: Option<Arc<dyn AnalyticsSink>>,
}

impl SearchOrchestrator {
    pub fn builder() -> SearchOrchestratorBuilder {
        SearchOrchestratorBuilder::new()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &FallbackCoordinator {
        &self.coordinator
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn correction_engine(&self) -> &CorrectionEngine {
        &self.correction
    }

    /// Execute a search.
    ///
    /// Returns an error only when the query fails validation. When every
    /// engine is down the response is empty with `used_engine == "none"`.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchResponse> {
        let started = Instant::now();

        self.normalizer.validate(&query)?;
        let normalized = self.normalizer.normalize(&query);

        let key = match self.cache.key_for(&normalized) {
            Ok(key) => Some(key),
            Err(e) => {
                log::warn!("Could not derive cache key, skipping cache: {}", e);
                None
            }
        };

        if let Some(key) = &key {
            if normalized.force_fresh() {
                self.cache.record_bypass().await;
            } else if let Some(cached) = self.cache.get(key).await {
                tracing::debug!(cache_key = %key, used_engine = %cached.used_engine, "cache hit");
                self.record(
                    SearchEvent::new(normalized.text(), &cached.used_engine, cached.total_count)
                        .with_cache_hit(true)
                        .with_execution_time(elapsed_ms(started.elapsed())),
                );
                return Ok(cached);
            }
        }

        let correction = self.correct(normalized.text());
        let executed = correction.corrected_query.clone();
        let phrasings = self.expand(&executed).await;

        let engine_query = EngineQuery::from_normalized(
            &normalized,
            executed.clone(),
            phrasings.iter().skip(1).cloned().collect(),
        );
        let outcome = self.coordinator.execute(&engine_query).await;
        let exhausted = outcome.is_exhausted();
        let failed = failed_engines(&outcome);

        let response = self.build_response(&normalized, &correction, &phrasings, outcome, started);

        if let Some(key) = &key {
            if exhausted {
                // An outage answer must not outlive the outage
                log::debug!("Not caching exhausted response for {}", key);
            } else {
                self.cache.set(key, &response, self.cache.ttl()).await;
            }
        }

        self.record(
            SearchEvent::new(normalized.text(), &response.used_engine, response.total_count)
                .with_correction(&executed, correction.corrections.len(), correction.confidence)
                .with_failed_engines(failed)
                .with_execution_time(response.search_time_ms),
        );

        Ok(response)
    }

    fn correct(&self, text: &str) -> CorrectionResult {
        match self.correction.correct_query(text) {
            Ok(result) => {
                if let Some(summary) = result.summary() {
                    tracing::debug!(original = %text, corrected = %result.corrected_query, "{}", summary);
                }
                result
            }
            Err(e) => {
                log::warn!("Query correction failed, using original text: {}", e);
                CorrectionResult::unchanged(text)
            }
        }
    }

    /// The executed text followed by its synonym variants
    async fn expand(&self, text: &str) -> Vec<String> {
        if !self.config.expand_queries {
            return vec![text.to_string()];
        }

        match self
            .correction
            .expand_query(text, self.correction.default_language())
            .await
        {
            Ok(phrasings) if !phrasings.is_empty() => phrasings,
            Ok(_) => vec![text.to_string()],
            Err(e) => {
                log::warn!("Query expansion failed, searching original text only: {}", e);
                vec![text.to_string()]
            }
        }
    }

    fn build_response(
        &self,
        normalized: &NormalizedQuery,
        correction: &CorrectionResult,
        phrasings: &[String],
        outcome: FallbackOutcome,
        started: Instant,
    ) -> SearchResponse {
        let pagination = normalized.pagination();
        let facets = self.facets.compute_facets(&outcome.results);
        let total_count = outcome.results.len();

        SearchResponse {
            results: pagination.apply(outcome.results),
            total_count,
            facets,
            suggestions: self.suggestions(normalized.text(), correction, phrasings),
            search_time_ms: elapsed_ms(started.elapsed()),
            query: correction.corrected_query.clone(),
            used_engine: outcome.used_engine,
            page: pagination.page,
            limit: pagination.limit,
            correction: correction.has_corrections().then(|| correction.clone()),
        }
    }

    /// Corrected query first (when it differs), then expansion variants
    fn suggestions(&self, original: &str, correction: &CorrectionResult, phrasings: &[String]) -> Vec<String> {
        let mut suggestions: Vec<String> = Vec::new();
        let candidates = std::iter::once(&correction.corrected_query).chain(phrasings.iter().skip(1));

        for candidate in candidates {
            if suggestions.len() >= self.config.max_suggestions {
                break;
            }
            if candidate != original && !suggestions.contains(candidate) {
                suggestions.push(candidate.clone());
            }
        }
        suggestions
    }

    fn record(&self, event: SearchEvent) {
        if let Some(sink) = &self.analytics {
            dispatch(Arc::clone(sink), event);
        }
    }

    /// Drop the cached response for one query
    pub async fn invalidate_cache(&self, query: &SearchQuery) {
        let normalized = self.normalizer.normalize(query);
        match self.cache.key_for(&normalized) {
            Ok(key) => self.cache.invalidate(&key).await,
            Err(e) => log::warn!("Could not derive cache key for invalidation: {}", e),
        }
    }

    /// Drop every cached response
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    /// Drop memoized corrections and synonym lookups
    pub fn clear_memo_caches(&self) {
        self.correction.clear_caches();
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    elapsed.as_millis() as u64
}

fn failed_engines(outcome: &FallbackOutcome) -> Vec<String> {
    outcome
        .attempts
        .iter()
        .filter(|a| matches!(a.outcome, AttemptOutcome::Failed(_) | AttemptOutcome::TimedOut))
        .map(|a| a.engine.clone())
        .collect()
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`SearchOrchestrator`]
pub struct SearchOrchestratorBuilder {
    search_config: SearchConfig,
    cache_config: CacheConfig,
    fallback_config: FallbackConfig,
    preprocess_config: PreprocessConfig,
    engines: Vec<(Arc<dyn SearchEngine>, i32)>,
    correction: Option<CorrectionEngine>,
    cache_store: Option<Arc<dyn CacheStore>>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
    facet_dimensions: Option<Vec<String>>,
}

impl SearchOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            search_config: SearchConfig::default(),
            cache_config: CacheConfig::default(),
            fallback_config: FallbackConfig::default(),
            preprocess_config: PreprocessConfig::default(),
            engines: Vec::new(),
            correction: None,
            cache_store: None,
            analytics: Some(Arc::new(TracingAnalytics)),
            facet_dimensions: None,
        }
    }

    /// Builder seeded with every section of an application config
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new()
            .with_search_config(config.search.clone())
            .with_cache_config(config.cache.clone())
            .with_fallback_config(config.engines.clone())
            .with_preprocess_config(config.preprocess())
    }

    pub fn with_search_config(mut self, config: SearchConfig) -> Self {
        self.search_config = config;
        self
    }

    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn with_fallback_config(mut self, config: FallbackConfig) -> Self {
        self.fallback_config = config;
        self
    }

    /// Used when no correction engine is supplied
    pub fn with_preprocess_config(mut self, config: PreprocessConfig) -> Self {
        self.preprocess_config = config;
        self
    }

    pub fn add_engine(mut self, engine: Arc<dyn SearchEngine>, priority: i32) -> Self {
        self.engines.push((engine, priority));
        self
    }

    pub fn with_correction_engine(mut self, engine: CorrectionEngine) -> Self {
        self.correction = Some(engine);
        self
    }

    pub fn with_cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = Some(store);
        self
    }

    pub fn with_analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    pub fn without_analytics(mut self) -> Self {
        self.analytics = None;
        self
    }

    pub fn with_facet_dimensions<I, S>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facet_dimensions = Some(dimensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Result<SearchOrchestrator> {
        let correction = match self.correction {
            Some(engine) => engine,
            None => CorrectionEngine::new(self.preprocess_config)
                .map_err(|e| SearchError::Config(format!("correction engine: {}", e)))?,
        };

        let coordinator = self
            .engines
            .into_iter()
            .fold(
                FallbackCoordinator::builder().with_config(self.fallback_config),
                |builder, (engine, priority)| builder.add_engine(engine, priority),
            )
            .build()?;

        let store = self
            .cache_store
            .unwrap_or_else(|| Arc::new(MemoryCacheStore::new(self.cache_config.capacity)));

        let facets = FacetAggregator::new(
            self.facet_dimensions
                .unwrap_or_else(|| self.search_config.facet_dimensions.clone()),
        );

        log::info!(
            "Search orchestrator ready with {} engine(s): {:?}",
            coordinator.engine_names().len(),
            coordinator.engine_names()
        );

        Ok(SearchOrchestrator {
            normalizer: QueryNormalizer::new(&self.search_config),
            config: self.search_config,
            correction,
            coordinator,
            cache: ResultCache::new(store, &self.cache_config),
            facets,
            analytics: self.analytics,
        })
    }
}

impl Default for SearchOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
