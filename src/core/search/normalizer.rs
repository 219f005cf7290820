//! Query Normalizer
//!
//! Validates raw queries and turns them into the canonical form every
//! downstream stage (cache key, correction, engines) works from.

use std::collections::BTreeSet;

use super::config::SearchConfig;
use super::error::ValidationError;
use super::models::{NormalizedQuery, Pagination, SearchFilters, SearchQuery};

/// Validates and canonicalizes search queries
#[derive(Debug, Clone)]
pub struct QueryNormalizer {
    min_length: usize,
    max_length: usize,
    max_limit: u32,
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl QueryNormalizer {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            min_length: config.min_query_length,
            max_length: config.max_query_length,
            max_limit: config.max_limit.max(1),
        }
    }

    /// Reject queries whose trimmed text is too short or too long.
    ///
    /// Length is counted in characters, not bytes.
    pub fn validate(&self, query: &SearchQuery) -> Result<(), ValidationError> {
        let length = query.text.trim().chars().count();

        if length < self.min_length {
            return Err(ValidationError::TooShort {
                min: self.min_length,
                actual: length,
            });
        }

        if length > self.max_length {
            return Err(ValidationError::TooLong {
                max: self.max_length,
                actual: length,
            });
        }

        Ok(())
    }

    /// Canonicalize a query: trim, collapse whitespace and lowercase the text,
    /// clamp pagination, and lowercase/trim filter values.
    pub fn normalize(&self, query: &SearchQuery) -> NormalizedQuery {
        let text = query
            .text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let pagination = Pagination {
            page: query.pagination.page.max(1),
            limit: query.pagination.limit.clamp(1, self.max_limit),
        };

        NormalizedQuery::new(
            text,
            normalize_filters(&query.filters),
            pagination,
            query.sort.unwrap_or_default(),
            query.force_fresh,
        )
    }
}

fn normalize_filters(filters: &SearchFilters) -> SearchFilters {
    SearchFilters {
        result_types: filters.result_types.clone(),
        statuses: normalize_values(&filters.statuses),
        categories: normalize_values(&filters.categories),
        date_range: filters.date_range,
    }
}

fn normalize_values(values: &BTreeSet<String>) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}
