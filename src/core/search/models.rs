//! Search Models
//!
//! Query, result and response types shared by every stage of the search path.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::preprocess::CorrectionResult;

// ============================================================================
// Query Types
// ============================================================================

/// Kind of record a search result points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Bill,
    Sponsor,
    Comment,
}

impl ResultType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Bill => "bill",
            ResultType::Sponsor => "sponsor",
            ResultType::Comment => "comment",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Relevance,
    Newest,
    Oldest,
    Title,
}

/// Inclusive date window, either end optional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Optional result filters.
///
/// Sets are ordered so that two logically equal filters always serialize the
/// same way, which the cache key depends on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub result_types: BTreeSet<ResultType>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub statuses: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.result_types.is_empty()
            && self.statuses.is_empty()
            && self.categories.is_empty()
            && self.date_range.is_none()
    }

    pub fn with_type(mut self, result_type: ResultType) -> Self {
        self.result_types.insert(result_type);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.statuses.insert(status.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn with_date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_range = Some(DateRange { from, to });
        self
    }

    /// Check a result against every populated filter.
    ///
    /// Status and category compare case-insensitively against the result's
    /// `status` / `category` metadata; the date range reads `date` as
    /// `YYYY-MM-DD`. A result missing a filtered field does not match.
    pub fn matches(&self, result: &SearchResult) -> bool {
        if !self.result_types.is_empty() && !self.result_types.contains(&result.result_type) {
            return false;
        }

        if !self.statuses.is_empty() {
            match result.metadata_str("status") {
                Some(status) if self.statuses.contains(&status.to_lowercase()) => {}
                _ => return false,
            }
        }

        if !self.categories.is_empty() {
            match result.metadata_str("category") {
                Some(category) if self.categories.contains(&category.to_lowercase()) => {}
                _ => return false,
            }
        }

        if let Some(range) = self.date_range {
            let date = result
                .metadata_str("date")
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
            match date {
                Some(date) if range.contains(date) => {}
                _ => return false,
            }
        }

        true
    }
}

/// Page selection. Normalization clamps `page >= 1` and `limit` to `[1, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Index of the first result on this page
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.limit as usize)
    }

    /// Slice a full match set down to this page
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect()
    }
}

/// A raw search request as received from the caller
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub sort: Option<SortOrder>,
    /// Skip the cache read path; the response is still written back.
    #[serde(default)]
    pub force_fresh: bool,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.pagination = Pagination::new(page, limit);
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn force_fresh(mut self) -> Self {
        self.force_fresh = true;
        self
    }
}

/// Canonical query produced by the normalizer.
///
/// Fields are private so a normalized query can't be mutated after the fact;
/// its serialization is the cache key input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedQuery {
    text: String,
    filters: SearchFilters,
    pagination: Pagination,
    sort: SortOrder,
    #[serde(skip)]
    force_fresh: bool,
}

impl NormalizedQuery {
    pub(crate) fn new(
        text: String,
        filters: SearchFilters,
        pagination: Pagination,
        sort: SortOrder,
        force_fresh: bool,
    ) -> Self {
        Self {
            text,
            filters,
            pagination,
            sort,
            force_fresh,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn force_fresh(&self) -> bool {
        self.force_fresh
    }
}

/// What a backend engine receives: the corrected text, alternate phrasings
/// from synonym expansion, and the filters and ordering to honor.
///
/// Engines return the full match set; pagination happens after facets are
/// computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineQuery {
    pub text: String,
    pub variants: Vec<String>,
    pub filters: SearchFilters,
    pub sort: SortOrder,
}

impl EngineQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            variants: Vec::new(),
            filters: SearchFilters::default(),
            sort: SortOrder::default(),
        }
    }

    pub fn from_normalized(normalized: &NormalizedQuery, text: String, variants: Vec<String>) -> Self {
        Self {
            text,
            variants,
            filters: normalized.filters().clone(),
            sort: normalized.sort(),
        }
    }

    /// The main text followed by every variant
    pub fn all_phrasings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.text.as_str()).chain(self.variants.iter().map(String::as_str))
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// A single matched record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub result_type: ResultType,
    pub title: String,
    /// Relevance score; one scale per response
    pub score: f64,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<String>,
}

impl SearchResult {
    pub fn new(
        id: impl Into<String>,
        result_type: ResultType,
        title: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            id: id.into(),
            result_type,
            title: title.into(),
            score,
            metadata: BTreeMap::new(),
            highlights: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_highlight(mut self, snippet: impl Into<String>) -> Self {
        self.highlights.push(snippet.into());
        self
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// Facet counts keyed by dimension, then by value.
///
/// The `types` dimension counts result types; other dimensions come from
/// result metadata. Empty when the match set is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facets(BTreeMap<String, BTreeMap<String, usize>>);

impl Facets {
    /// Name of the result-type dimension
    pub const TYPES: &'static str = "types";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn types(&self) -> Option<&BTreeMap<String, usize>> {
        self.0.get(Self::TYPES)
    }

    pub fn dimension(&self, name: &str) -> Option<&BTreeMap<String, usize>> {
        self.0.get(name)
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn count(&self, dimension: &str, value: &str) -> usize {
        self.0
            .get(dimension)
            .and_then(|values| values.get(value))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all counts in one dimension
    pub fn total(&self, dimension: &str) -> usize {
        self.0
            .get(dimension)
            .map(|values| values.values().sum())
            .unwrap_or(0)
    }

    pub(crate) fn increment(&mut self, dimension: &str, value: &str) {
        *self
            .0
            .entry(dimension.to_string())
            .or_default()
            .entry(value.to_string())
            .or_insert(0) += 1;
    }
}

/// Response handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Results on the requested page
    pub results: Vec<SearchResult>,
    /// Size of the full match set, before pagination
    pub total_count: usize,
    pub facets: Facets,
    pub suggestions: Vec<String>,
    pub search_time_ms: u64,
    /// Query text that was executed (after correction)
    pub query: String,
    /// Engine that produced the results, or `"none"` when every engine was
    /// down
    pub used_engine: String,
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<CorrectionResult>,
}

impl SearchResponse {
    /// Well-formed response with no results
    pub fn empty(query: impl Into<String>, used_engine: impl Into<String>, pagination: Pagination) -> Self {
        Self {
            results: Vec::new(),
            total_count: 0,
            facets: Facets::new(),
            suggestions: Vec::new(),
            search_time_ms: 0,
            query: query.into(),
            used_engine: used_engine.into(),
            page: pagination.page,
            limit: pagination.limit,
            correction: None,
        }
    }
}
