//! Query Preprocessing Module
//!
//! Typo correction, phonetic matching and synonym expansion for civic
//! search queries.
//!
//! ## Architecture
//!
//! ```text
//! Normalized query: "healtcare reform"
//!        │
//!        ▼
//! ┌──────────────────────────────┐
//! │  1. Correction               │  "healtcare" → "healthcare"
//! │     known typos, fuzzy,      │  (Levenshtein similarity 0.9)
//! │     phonetic                 │
//! └──────────────┬───────────────┘
//!                ▼
//! ┌──────────────────────────────┐
//! │  2. Expansion                │  "healthcare reform"
//! │     thesaurus + adjacency    │  "health care reform"
//! │                              │  "healthcare overhaul"
//! └──────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod phonetic;
pub mod pipeline;
pub mod synonyms;
pub mod typo;

// Re-exports for convenience
pub use config::{CorrectionConfig, PreprocessConfig, SynonymConfig};
pub use error::{PreprocessError, PreprocessResult};
pub use phonetic::{phonetic_code, PhoneticIndex};
pub use pipeline::CorrectionEngine;
pub use synonyms::{
    LookupScope, StaticThesaurus, SynonymEntry, SynonymRelation, SynonymResult, ThesaurusMatch,
    ThesaurusProvider,
};
pub use typo::{similarity, CorrectionKind, CorrectionResult, TokenCorrection, TypoCorrector};
