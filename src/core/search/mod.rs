//! Search Module
//!
//! Query-resilient search over pluggable backends.
//!
//! - `normalizer`: validation and canonical form of incoming queries
//! - `cache`: TTL memoization of complete responses
//! - `facets`: counts over the full match set
//! - `orchestrator`: the end-to-end request path
//! - `analytics`: fire-and-forget search events
//! - `memory_engine`: in-process reference backend

pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod facets;
pub mod memory_engine;
pub mod models;
pub mod normalizer;
pub mod orchestrator;

pub use analytics::{AnalyticsSink, AnalyticsSummary, InMemoryAnalytics, SearchEvent, TracingAnalytics};
pub use cache::{CacheConfig, CacheKey, CacheStats, CacheStore, MemoryCacheStore, ResultCache};
pub use config::SearchConfig;
pub use error::{CacheError, Result, SearchError, ValidationError};
pub use facets::FacetAggregator;
pub use memory_engine::InMemoryEngine;
pub use models::{
    DateRange, EngineQuery, Facets, NormalizedQuery, Pagination, ResultType, SearchFilters,
    SearchQuery, SearchResponse, SearchResult, SortOrder,
};
pub use normalizer::QueryNormalizer;
pub use orchestrator::{SearchOrchestrator, SearchOrchestratorBuilder};
