//! Preprocessing Configuration
//!
//! Configuration structures for typo correction and synonym expansion.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Overall preprocessing configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Typo and phonetic correction configuration
    #[serde(default)]
    pub correction: CorrectionConfig,

    /// Synonym expansion configuration
    #[serde(default)]
    pub synonyms: SynonymConfig,
}

/// Typo correction configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CorrectionConfig {
    /// Whether correction is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Tokens shorter than this (in characters) are never corrected
    #[serde(default = "default_min_token_length")]
    pub min_token_length: usize,

    /// Fuzzy candidates must score strictly above this similarity
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Confidence assigned to known-typo table hits
    #[serde(default = "default_known_typo_confidence")]
    pub known_typo_confidence: f64,

    /// Confidence assigned to phonetic matches
    #[serde(default = "default_phonetic_confidence")]
    pub phonetic_confidence: f64,

    /// Upper bound on fuzzy comparisons per token
    #[serde(default = "default_max_fuzzy_candidates")]
    pub max_fuzzy_candidates: usize,

    /// Capacity of the per-query correction memo
    #[serde(default = "default_memo_capacity")]
    pub memo_capacity: usize,

    /// Words that should never be corrected
    #[serde(default)]
    pub protected_words: Vec<String>,

    /// Extra vocabulary words, added to the built-in civic vocabulary
    #[serde(default)]
    pub extra_vocabulary: Vec<String>,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_token_length: default_min_token_length(),
            fuzzy_threshold: default_fuzzy_threshold(),
            known_typo_confidence: default_known_typo_confidence(),
            phonetic_confidence: default_phonetic_confidence(),
            max_fuzzy_candidates: default_max_fuzzy_candidates(),
            memo_capacity: default_memo_capacity(),
            protected_words: Vec::new(),
            extra_vocabulary: Vec::new(),
        }
    }
}

/// Synonym expansion configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SynonymConfig {
    /// Whether synonym expansion is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Language treated as the thesaurus' own; other languages add translations
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Cap on entries in one synonym result
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// A synonym must score strictly above this to be substituted
    #[serde(default = "default_expansion_threshold")]
    pub expansion_threshold: f64,

    /// Cap on query variants, including the unmodified query
    #[serde(default = "default_max_variants")]
    pub max_variants: usize,

    /// Capacity of the (term, language) synonym memo
    #[serde(default = "default_memo_capacity")]
    pub memo_capacity: usize,

    /// Optional TOML thesaurus merged over the built-in one
    #[serde(default)]
    pub thesaurus_path: Option<PathBuf>,

    /// Whether to include the built-in civic thesaurus
    #[serde(default = "default_true")]
    pub use_builtin_thesaurus: bool,
}

impl Default for SynonymConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_language: default_language(),
            max_results: default_max_results(),
            expansion_threshold: default_expansion_threshold(),
            max_variants: default_max_variants(),
            memo_capacity: default_memo_capacity(),
            thesaurus_path: None,
            use_builtin_thesaurus: true,
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_min_token_length() -> usize {
    3
}
fn default_fuzzy_threshold() -> f64 {
    0.8
}
fn default_known_typo_confidence() -> f64 {
    0.9
}
fn default_phonetic_confidence() -> f64 {
    0.7
}
fn default_max_fuzzy_candidates() -> usize {
    2_000
}
fn default_memo_capacity() -> usize {
    1_024
}
fn default_language() -> String {
    "en".to_string()
}
fn default_max_results() -> usize {
    10
}
fn default_expansion_threshold() -> f64 {
    0.6
}
fn default_max_variants() -> usize {
    5
}
