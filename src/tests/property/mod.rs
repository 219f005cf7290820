//! Property-based tests
//!
//! Invariants that should hold for all inputs, checked with proptest.
//!
//! ## Test Modules
//!
//! - `cache_key_props`: cache keys for normalized queries
//!   - Stable under whitespace, case and filter insertion order
//!   - Never affected by the fresh-read marker
//!
//! - `correction_props`: typo correction and normalization
//!   - Confidences stay within [0, 1]
//!   - Overall confidence is the mean of token confidences
//!   - Short and numeric tokens pass through unchanged
//!   - Normalized pagination is always in range
//!
//! - `facet_props`: facet aggregation
//!   - Type counts sum to the size of the match set
//!   - Every metadata dimension counts at most one value per result
//!
//! ## Configuration
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod cache_key_props;
mod correction_props;
mod facet_props;
