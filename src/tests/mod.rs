//! Crate-level test suites
//!
//! - `common`: shared fixtures and scripted engines
//! - `mocks`: mockall doubles for collaborator traits
//! - `property`: proptest invariants
//! - `integration`: end-to-end orchestrator scenarios

mod common;
mod integration;
mod mocks;
mod property;
