//! Mock implementations for testing
//!
//! mockall doubles for the collaborator traits the orchestrator consumes,
//! so failure paths can be driven without real infrastructure.

#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;

use crate::core::preprocess::{PreprocessResult, ThesaurusMatch, ThesaurusProvider};
use crate::core::search::{CacheError, CacheStore};

// ============================================================================
// Cache Store Mock
// ============================================================================

mock! {
    pub Store {}

    #[async_trait]
    impl CacheStore for Store {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
        async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
        async fn delete(&self, key: &str) -> Result<(), CacheError>;
        async fn clear(&self) -> Result<(), CacheError>;
    }
}

/// Store whose every operation fails
pub fn broken_store() -> MockStore {
    let mut store = MockStore::new();
    store
        .expect_get()
        .returning(|_| Err(CacheError::Store("connection refused".into())));
    store
        .expect_set()
        .returning(|_, _, _| Err(CacheError::Store("connection refused".into())));
    store
        .expect_delete()
        .returning(|_| Err(CacheError::Store("connection refused".into())));
    store
        .expect_clear()
        .returning(|| Err(CacheError::Store("connection refused".into())));
    store
}

// ============================================================================
// Thesaurus Mock
// ============================================================================

mock! {
    pub Thesaurus {}

    #[async_trait]
    impl ThesaurusProvider for Thesaurus {
        fn subject_areas(&self) -> Vec<String>;
        async fn lookup(&self, term: &str) -> PreprocessResult<Vec<ThesaurusMatch>>;
        async fn translations(&self, term: &str, language: &str) -> PreprocessResult<Vec<String>>;
    }
}
