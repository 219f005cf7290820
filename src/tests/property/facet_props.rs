//! Property-based tests for Facet Aggregation
//!
//! Tests invariants:
//! - Type counts sum to the size of the match set
//! - A scalar dimension counts each result carrying a value exactly once
//! - Aggregation does not depend on result order

use proptest::prelude::*;

use crate::core::search::{FacetAggregator, ResultType, SearchResult};

fn result_strategy() -> impl Strategy<Value = SearchResult> {
    (
        prop_oneof![
            Just(ResultType::Bill),
            Just(ResultType::Sponsor),
            Just(ResultType::Comment),
        ],
        prop::option::of(prop_oneof![
            Just("Passed"),
            Just("introduced"),
            Just(" vetoed "),
        ]),
        "[a-z0-9]{1,6}",
    )
        .prop_map(|(result_type, status, id)| {
            let result = SearchResult::new(id, result_type, "Result", 1.0);
            match status {
                Some(status) => result.with_metadata("status", status),
                None => result,
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_type_counts_sum_to_total(results in prop::collection::vec(result_strategy(), 0..60)) {
        let facets = FacetAggregator::default().compute_facets(&results);

        prop_assert_eq!(facets.total("types"), results.len());
        prop_assert_eq!(facets.is_empty(), results.is_empty());
    }

    #[test]
    fn prop_status_counted_once_per_result(results in prop::collection::vec(result_strategy(), 0..60)) {
        let facets = FacetAggregator::default().compute_facets(&results);
        let with_status = results.iter().filter(|r| r.metadata.contains_key("status")).count();

        prop_assert_eq!(facets.total("status"), with_status);
        prop_assert_eq!(facets.count("status", "Passed"), 0);
    }

    #[test]
    fn prop_order_independent(results in prop::collection::vec(result_strategy(), 0..40)) {
        let aggregator = FacetAggregator::default();
        let mut reversed = results.clone();
        reversed.reverse();

        prop_assert_eq!(aggregator.compute_facets(&results), aggregator.compute_facets(&reversed));
    }
}
