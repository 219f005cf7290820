//! Facet Aggregation
//!
//! Counts over the complete match set, computed before pagination so facet
//! totals always agree with `total_count`.

use serde_json::Value;

use super::config::SearchConfig;
use super::models::{Facets, SearchResult};

/// Computes facet counts by result type and configured metadata dimensions
#[derive(Debug, Clone)]
pub struct FacetAggregator {
    dimensions: Vec<String>,
}

impl Default for FacetAggregator {
    fn default() -> Self {
        Self::new(SearchConfig::default().facet_dimensions)
    }
}

impl FacetAggregator {
    /// Aggregator over the given metadata keys. The result-type dimension
    /// is always counted and cannot be shadowed by a metadata key.
    pub fn new<I, S>(dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for dimension in dimensions {
            let dimension = dimension.into();
            if dimension != Facets::TYPES && !unique.contains(&dimension) {
                unique.push(dimension);
            }
        }
        Self { dimensions: unique }
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Single pass over `results`.
    ///
    /// Every result adds one to `types`. String, number and boolean metadata
    /// values are counted under their dimension (strings trimmed and
    /// lowercased); arrays count each element; missing, null or blank
    /// values are not counted.
    pub fn compute_facets(&self, results: &[SearchResult]) -> Facets {
        let mut facets = Facets::new();

        for result in results {
            facets.increment(Facets::TYPES, result.result_type.as_str());

            for dimension in &self.dimensions {
                match result.metadata.get(dimension) {
                    Some(Value::Array(values)) => {
                        for value in values {
                            count_value(&mut facets, dimension, value);
                        }
                    }
                    Some(value) => count_value(&mut facets, dimension, value),
                    None => {}
                }
            }
        }

        facets
    }
}

fn count_value(facets: &mut Facets, dimension: &str, value: &Value) {
    let label = match value {
        Value::String(s) => s.trim().to_lowercase(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return,
    };
    if !label.is_empty() {
        facets.increment(dimension, &label);
    }
}
