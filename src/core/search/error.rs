//! Search Error Types
//!
//! Error handling for the search orchestration layer. Only validation errors
//! ever reach a caller of `SearchOrchestrator::search`; engine, cache and
//! correction failures are recovered where they happen.

use thiserror::Error;

use crate::core::engines::EngineError;

/// Query rejected before any engine is touched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Query too short: {actual} characters (minimum {min})")]
    TooShort { min: usize, actual: usize },

    #[error("Query too long: {actual} characters (maximum {max})")]
    TooLong { max: usize, actual: usize },
}

/// Failures of the result cache's backing store
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache store error: {0}")]
    Store(String),

    #[error("Cache payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Search operation errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] ValidationError),

    #[error("Engine registry error: {0}")]
    Registry(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
