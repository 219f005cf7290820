//! End-to-end search scenarios
//!
//! Drives the orchestrator through failover, caching, correction and
//! degradation paths with scripted engines and mocked collaborators.

use std::sync::Arc;
use std::time::Duration;

use crate::core::engines::{EngineState, NO_ENGINE};
use crate::core::preprocess::{CorrectionEngine, PreprocessConfig, PreprocessError, TypoCorrector};
use crate::core::search::{CacheKey, QueryNormalizer, SearchError, SearchFilters, SearchQuery};
use crate::tests::common::*;
use crate::tests::mocks::{broken_store, MockThesaurus};

// ============================================================================
// Specified Scenarios
// ============================================================================

#[tokio::test]
async fn scenario_a_corrected_query_served_by_third_engine() {
    let fulltext = ScriptedEngine::failing("fulltext");
    let fuzzy = ScriptedEngine::failing("fuzzy");
    let backup = ScriptedEngine::succeeding(
        "backup",
        vec![
            bill("hb-101", "Healthcare Reform Act", "introduced"),
            bill("hb-102", "Healthcare Reform Study", "passed"),
        ],
    );
    let (orchestrator, analytics) =
        orchestrator_with(&[fulltext.clone(), fuzzy.clone(), backup.clone()]);

    let response = orchestrator
        .search(SearchQuery::new("healtcare reform"))
        .await
        .unwrap();

    assert_eq!(response.query, "healthcare reform");
    assert_eq!(response.total_count, 2);
    assert_eq!(response.facets.count("types", "bill"), 2);
    assert_eq!(response.used_engine, "backup");
    assert_eq!(backup.last_query().unwrap().text, "healthcare reform");

    let correction = response.correction.as_ref().unwrap();
    assert_eq!(correction.corrections.len(), 1);
    assert_eq!(correction.corrections[0].original, "healtcare");
    assert_eq!(correction.corrections[0].position, 0);

    settle_analytics(&analytics, 1).await;
    let events = analytics.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].used_engine, "backup");
    assert_eq!(events[0].failed_engines, vec!["fulltext", "fuzzy"]);
    assert_eq!(events[0].corrections, 1);
    assert!(!events[0].cache_hit);
}

#[tokio::test]
async fn scenario_b_repeat_query_served_from_cache() {
    let fulltext = ScriptedEngine::succeeding("fulltext", mixed_results(4));
    let (orchestrator, analytics) = orchestrator_with(&[fulltext.clone()]);

    let first = orchestrator.search(SearchQuery::new("budget")).await.unwrap();
    let second = orchestrator.search(SearchQuery::new("budget")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(fulltext.calls(), 1);

    let stats = orchestrator.cache().stats().await;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);

    settle_analytics(&analytics, 2).await;
    let events = analytics.events();
    assert_eq!(events.len(), 2);
    assert!(events[1].cache_hit);
}

#[tokio::test]
async fn scenario_c_all_engines_down_returns_empty_response() {
    let fulltext = ScriptedEngine::failing("fulltext");
    let fuzzy = ScriptedEngine::failing("fuzzy");
    let (orchestrator, _analytics) = orchestrator_with(&[fulltext, fuzzy]);

    let response = orchestrator.search(SearchQuery::new("budget")).await.unwrap();

    assert!(response.results.is_empty());
    assert_eq!(response.total_count, 0);
    assert!(response.facets.is_empty());
    assert_eq!(response.used_engine, NO_ENGINE);

    // Outage answers are not cached
    assert_eq!(orchestrator.cache().stats().await.writes, 0);
}

// ============================================================================
// Determinism
// ============================================================================

#[tokio::test]
async fn same_logical_query_shares_cache_key_and_ordering() {
    let normalizer = QueryNormalizer::default();
    let a = normalizer.normalize(
        &SearchQuery::new("  Budget   Reform ")
            .with_filters(SearchFilters::default().with_status("Passed").with_status("introduced")),
    );
    let b = normalizer.normalize(
        &SearchQuery::new("budget reform")
            .with_filters(SearchFilters::default().with_status("introduced").with_status("passed")),
    );
    assert_eq!(CacheKey::for_query(&a).unwrap(), CacheKey::for_query(&b).unwrap());

    let fulltext = ScriptedEngine::succeeding("fulltext", mixed_results(6));
    let (orchestrator, _) = orchestrator_with(&[fulltext.clone()]);

    let first = orchestrator.search(SearchQuery::new("budget reform")).await.unwrap();
    let fresh = orchestrator
        .search(SearchQuery::new("budget reform").force_fresh())
        .await
        .unwrap();

    let ids = |r: &crate::core::search::SearchResponse| r.results.iter().map(|x| x.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&first), ids(&fresh));
    assert_eq!(fulltext.calls(), 2);
}

#[tokio::test]
async fn facets_count_full_set_on_every_page() {
    let fulltext = ScriptedEngine::succeeding("fulltext", mixed_results(25));
    let (orchestrator, _) = orchestrator_with(&[fulltext]);

    for page in 1..=4 {
        let response = orchestrator
            .search(SearchQuery::new("budget").with_page(page, 10))
            .await
            .unwrap();

        assert_eq!(response.total_count, 25);
        assert_eq!(response.facets.total("types"), response.total_count);
        assert_eq!(response.results.len(), [10, 10, 5, 0][page as usize - 1]);
    }
}

// ============================================================================
// Cache Behavior
// ============================================================================

#[tokio::test]
async fn force_fresh_skips_read_but_still_writes() {
    let fulltext = ScriptedEngine::succeeding("fulltext", mixed_results(2));
    let (orchestrator, _) = orchestrator_with(&[fulltext.clone()]);

    orchestrator.search(SearchQuery::new("transit")).await.unwrap();

    fulltext.set_script(Script::Results(mixed_results(3)));
    let fresh = orchestrator
        .search(SearchQuery::new("transit").force_fresh())
        .await
        .unwrap();
    assert_eq!(fresh.total_count, 3);

    let cached = orchestrator.search(SearchQuery::new("transit")).await.unwrap();
    assert_eq!(cached, fresh);
    assert_eq!(fulltext.calls(), 2);

    let stats = orchestrator.cache().stats().await;
    assert_eq!(stats.bypasses, 1);
    assert_eq!(stats.writes, 2);
    assert_eq!(stats.hits, 1);
}

#[tokio::test]
async fn broken_cache_store_never_fails_search() {
    let fulltext = ScriptedEngine::succeeding("fulltext", mixed_results(3));
    let orchestrator = builder_with(&[fulltext.clone()])
        .with_cache_store(Arc::new(broken_store()))
        .without_analytics()
        .build()
        .unwrap();

    let first = orchestrator.search(SearchQuery::new("housing")).await.unwrap();
    let second = orchestrator.search(SearchQuery::new("housing")).await.unwrap();

    assert_eq!(first.total_count, 3);
    assert_eq!(second.total_count, 3);
    assert_eq!(fulltext.calls(), 2);

    let stats = orchestrator.cache().stats().await;
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.errors, 4);

    // Maintenance hooks swallow store errors too
    orchestrator.invalidate_cache(&SearchQuery::new("housing")).await;
    orchestrator.clear_cache().await;
}

// ============================================================================
// Engine Health
// ============================================================================

#[tokio::test(start_paused = true)]
async fn failed_engine_skipped_until_cooldown_elapses() {
    let primary = ScriptedEngine::failing("primary");
    let secondary = ScriptedEngine::succeeding("secondary", mixed_results(1));
    let (orchestrator, _) = orchestrator_with(&[primary.clone(), secondary.clone()]);

    let response = orchestrator.search(SearchQuery::new("zoning")).await.unwrap();
    assert_eq!(response.used_engine, "secondary");

    primary.set_script(Script::Results(mixed_results(2)));
    tokio::time::advance(Duration::from_secs(120)).await;

    let response = orchestrator.search(SearchQuery::new("wetlands")).await.unwrap();
    assert_eq!(response.used_engine, "secondary");
    assert_eq!(primary.calls(), 1);

    tokio::time::advance(Duration::from_secs(180)).await;
    assert_eq!(
        orchestrator.coordinator().engine_state("primary").await,
        Some(EngineState::Available)
    );

    let response = orchestrator.search(SearchQuery::new("pensions")).await.unwrap();
    assert_eq!(response.used_engine, "primary");
    assert_eq!(primary.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn hanging_engine_times_out_and_falls_through() {
    let stuck = ScriptedEngine::hanging("stuck");
    let backup = ScriptedEngine::succeeding("backup", mixed_results(2));
    let (orchestrator, analytics) = orchestrator_with(&[stuck.clone(), backup]);

    let response = orchestrator.search(SearchQuery::new("broadband")).await.unwrap();

    assert_eq!(response.used_engine, "backup");
    assert_eq!(
        orchestrator.coordinator().engine_state("stuck").await,
        Some(EngineState::CoolingDown)
    );

    settle_analytics(&analytics, 1).await;
    assert_eq!(analytics.events()[0].failed_engines, vec!["stuck"]);
}

// ============================================================================
// Validation and Degradation
// ============================================================================

#[tokio::test]
async fn invalid_query_rejected_before_engines() {
    let fulltext = ScriptedEngine::succeeding("fulltext", mixed_results(1));
    let (orchestrator, _) = orchestrator_with(&[fulltext.clone()]);

    let too_short = orchestrator.search(SearchQuery::new("  x ")).await;
    let too_long = orchestrator.search(SearchQuery::new("a".repeat(501))).await;

    assert!(matches!(too_short, Err(SearchError::InvalidQuery(_))));
    assert!(matches!(too_long, Err(SearchError::InvalidQuery(_))));
    assert_eq!(fulltext.calls(), 0);
}

#[tokio::test]
async fn thesaurus_failure_degrades_to_adjacency_table() {
    let mut thesaurus = MockThesaurus::new();
    thesaurus.expect_subject_areas().returning(Vec::new);
    thesaurus
        .expect_lookup()
        .returning(|_| Err(PreprocessError::LookupFailed("thesaurus offline".into())));

    let config = PreprocessConfig::default();
    let correction = CorrectionEngine::with_components(
        TypoCorrector::new(config.correction.clone()),
        Arc::new(thesaurus),
        config,
    );

    let fulltext = ScriptedEngine::succeeding("fulltext", mixed_results(2));
    let orchestrator = builder_with(&[fulltext.clone()])
        .with_correction_engine(correction)
        .without_analytics()
        .build()
        .unwrap();

    let response = orchestrator.search(SearchQuery::new("budget")).await.unwrap();

    assert_eq!(response.used_engine, "fulltext");
    let query = fulltext.last_query().unwrap();
    assert_eq!(query.text, "budget");
    assert!(query.variants.contains(&"spending".to_string()));

    // Degraded lookups are not memoized
    assert_eq!(orchestrator.correction_engine().memo_sizes().1, 0);
}

#[tokio::test]
async fn synonym_variants_reach_the_engine() {
    let fulltext = ScriptedEngine::succeeding("fulltext", mixed_results(1));
    let (orchestrator, _) = orchestrator_with(&[fulltext.clone()]);

    let response = orchestrator.search(SearchQuery::new("school funding")).await.unwrap();

    let query = fulltext.last_query().unwrap();
    assert_eq!(query.text, "school funding");
    assert!(query.variants.contains(&"educational institution funding".to_string()));
    assert!(response.suggestions.contains(&"educational institution funding".to_string()));
    assert!(response.correction.is_none());
}

#[tokio::test]
async fn filters_and_sort_forwarded_normalized() {
    let fulltext = ScriptedEngine::succeeding("fulltext", mixed_results(1));
    let (orchestrator, _) = orchestrator_with(&[fulltext.clone()]);

    orchestrator
        .search(
            SearchQuery::new("budget")
                .with_filters(SearchFilters::default().with_category(" Health "))
                .with_sort(crate::core::search::SortOrder::Newest),
        )
        .await
        .unwrap();

    let query = fulltext.last_query().unwrap();
    assert!(query.filters.categories.contains("health"));
    assert_eq!(query.sort, crate::core::search::SortOrder::Newest);
}
