//! Property-based tests for Query Correction and Normalization
//!
//! Tests invariants:
//! - Token and overall confidences stay within [0, 1]
//! - Overall confidence is the mean of token confidences (1.0 when none)
//! - Every correction points at the token it replaced
//! - Short and purely numeric tokens pass through unchanged
//! - Normalized pagination is always within bounds

use proptest::prelude::*;

use crate::core::preprocess::TypoCorrector;
use crate::core::search::{QueryNormalizer, SearchQuery};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_confidences_bounded_and_averaged(
        words in prop::collection::vec("[a-z]{1,12}", 1..6),
    ) {
        let corrector = TypoCorrector::default();
        let query = words.join(" ");
        let result = corrector.correct_query(&query);

        prop_assert!((0.0..=1.0).contains(&result.confidence));
        for correction in &result.corrections {
            prop_assert!((0.0..=1.0).contains(&correction.confidence));
            prop_assert!(correction.position < words.len());
        }

        if result.corrections.is_empty() {
            prop_assert_eq!(result.confidence, 1.0);
            prop_assert_eq!(&result.corrected_query, &query);
        } else {
            let mean = result.corrections.iter().map(|c| c.confidence).sum::<f64>()
                / result.corrections.len() as f64;
            prop_assert!((result.confidence - mean).abs() < 1e-9);
        }

        let tokens: Vec<&str> = query.split_whitespace().collect();
        for correction in &result.corrections {
            prop_assert_eq!(tokens[correction.position], correction.original.as_str());
            prop_assert_ne!(&correction.corrected, &correction.original);
        }
    }

    #[test]
    fn prop_short_tokens_untouched(token in "[a-z]{1,2}") {
        let corrector = TypoCorrector::default();
        prop_assert!(corrector.correct_word(&token).is_none());
    }

    #[test]
    fn prop_numeric_tokens_untouched(token in "[0-9]{1,10}") {
        let corrector = TypoCorrector::default();
        prop_assert!(corrector.correct_word(&token).is_none());
    }

    #[test]
    fn prop_normalized_pagination_in_bounds(page in any::<u32>(), limit in any::<u32>()) {
        let normalized = QueryNormalizer::default()
            .normalize(&SearchQuery::new("budget").with_page(page, limit));
        let pagination = normalized.pagination();

        prop_assert!(pagination.page >= 1);
        prop_assert!((1..=100).contains(&pagination.limit));
    }
}
