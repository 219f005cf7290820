pub mod engines;
pub mod logging;

// Query preprocessing: typo correction + synonym expansion
pub mod preprocess;

// Normalization, caching, facets and the request orchestrator
pub mod search;
