//! Integration tests
//!
//! End-to-end runs of the search orchestrator against scripted engines.

mod search_scenarios;
