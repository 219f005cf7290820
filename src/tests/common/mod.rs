//! Common Test Utilities
//!
//! Shared fixtures used across test modules:
//! - Scripted engines with switchable behavior (`fixtures`)
//! - Result and corpus builders
//! - Orchestrator assembly with an in-memory analytics sink

pub mod fixtures;

pub use fixtures::*;
