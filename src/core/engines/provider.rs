//! Search Engine Trait
//!
//! Interface every pluggable search backend implements.

use async_trait::async_trait;

use super::error::Result;
use crate::core::search::models::{EngineQuery, SearchResult};

/// A backend capable of executing a query and returning ranked results.
///
/// Engines return the full match set for the query's filters; the
/// orchestrator paginates after computing facets. Availability is owned by
/// the coordinator, not by the engine.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Unique name, reported as `used_engine` when this engine serves a request
    fn name(&self) -> &str;

    /// Execute a query
    async fn search(&self, query: &EngineQuery) -> Result<Vec<SearchResult>>;
}
