//! Preprocessing Error Types

use thiserror::Error;

/// Errors that can occur during query correction and expansion
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Thesaurus lookup failed: {0}")]
    LookupFailed(String),

    #[error("Thesaurus parse failed: {0}")]
    SynonymParse(String),

    #[error("Memo cache poisoned: {0}")]
    MemoPoisoned(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for preprocessing operations
pub type PreprocessResult<T> = Result<T, PreprocessError>;
