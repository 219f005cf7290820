//! Property-based tests for Cache Keys
//!
//! Tests invariants:
//! - Keys ignore whitespace and case differences in the query text
//! - Keys ignore filter insertion order
//! - Keys ignore the fresh-read marker
//! - Different pages never share a key

use proptest::prelude::*;

use crate::core::search::{CacheKey, QueryNormalizer, SearchFilters, SearchQuery};

fn key_for(query: &SearchQuery) -> CacheKey {
    let normalized = QueryNormalizer::default().normalize(query);
    CacheKey::for_query(&normalized).unwrap()
}

fn filters_from(statuses: &[String]) -> SearchFilters {
    statuses
        .iter()
        .fold(SearchFilters::default(), |filters, status| filters.with_status(status.clone()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_key_ignores_spacing_and_case(
        words in prop::collection::vec("[a-z]{1,8}", 1..5),
        padding in 1usize..4,
    ) {
        let canonical = words.join(" ");
        let messy = format!(
            "{}{}{}",
            " ".repeat(padding),
            words.iter().map(|w| w.to_uppercase()).collect::<Vec<_>>().join(&" ".repeat(padding)),
            "\t"
        );

        prop_assert_eq!(key_for(&SearchQuery::new(canonical)), key_for(&SearchQuery::new(messy)));
    }

    #[test]
    fn prop_key_ignores_filter_order(
        statuses in prop::collection::vec("[a-z]{3,8}", 0..5),
    ) {
        let mut reversed = statuses.clone();
        reversed.reverse();

        let forward = SearchQuery::new("budget").with_filters(filters_from(&statuses));
        let backward = SearchQuery::new("budget").with_filters(filters_from(&reversed));

        prop_assert_eq!(key_for(&forward), key_for(&backward));
    }

    #[test]
    fn prop_key_ignores_force_fresh(text in "[a-z]{2,20}") {
        let normal = SearchQuery::new(text.clone());
        let fresh = SearchQuery::new(text).force_fresh();
        prop_assert_eq!(key_for(&normal), key_for(&fresh));
    }

    #[test]
    fn prop_distinct_pages_distinct_keys(page in 1u32..50, limit in 1u32..100) {
        let here = SearchQuery::new("budget").with_page(page, limit);
        let next = SearchQuery::new("budget").with_page(page + 1, limit);
        prop_assert_ne!(key_for(&here), key_for(&next));
    }
}
