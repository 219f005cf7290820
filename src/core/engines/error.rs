//! Engine Error Types
//!
//! Failures of individual backends and of engine registration. Backend
//! failures never leave the fallback coordinator.

use std::time::Duration;

/// Errors raised by search engines and the engine registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Engine timed out after {0:?}")]
    Timeout(Duration),

    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Duplicate engine name: {0}")]
    DuplicateEngine(String),

    #[error("Unknown engine: {0}")]
    UnknownEngine(String),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
