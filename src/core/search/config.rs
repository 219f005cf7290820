//! Search Configuration
//!
//! Query limits and orchestration switches.

use serde::{Deserialize, Serialize};

// ============================================================================
// Query Limit Constants
// ============================================================================

/// Shortest accepted query, in characters after trimming
pub const MIN_QUERY_LENGTH: usize = 2;
/// Longest accepted query, in characters after trimming
pub const MAX_QUERY_LENGTH: usize = 500;
/// Largest page size a caller may request
pub const MAX_PAGE_LIMIT: u32 = 100;

// ============================================================================
// Search Configuration
// ============================================================================

/// Orchestrator-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub min_query_length: usize,
    pub max_query_length: usize,
    pub max_limit: u32,
    /// Generate synonym variants and pass them to engines
    pub expand_queries: bool,
    /// Cap on suggestions returned with a response
    pub max_suggestions: usize,
    /// Metadata keys counted as facet dimensions (besides result type)
    pub facet_dimensions: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: MIN_QUERY_LENGTH,
            max_query_length: MAX_QUERY_LENGTH,
            max_limit: MAX_PAGE_LIMIT,
            expand_queries: true,
            max_suggestions: 5,
            facet_dimensions: ["status", "chamber", "jurisdiction", "category"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}
