//! Correction Engine
//!
//! Memoized front end over the typo corrector and the thesaurus:
//! 1. `correct_query`: typo, phonetic and colloquial corrections
//! 2. `find_synonyms`: ranked synonyms for one term
//! 3. `expand_query`: alternate phrasings for engines to match against
//!
//! Memo maps are bounded LRU caches and can be cleared at any time.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use super::config::PreprocessConfig;
use super::error::{PreprocessError, PreprocessResult};
use super::synonyms::{
    rank_synonyms, semantic_adjacency, Candidate, LookupScope, StaticThesaurus, SynonymEntry,
    SynonymRelation, SynonymResult, ThesaurusProvider,
};
use super::typo::{CorrectionResult, TypoCorrector};

/// Confidence given to translated terms
const TRANSLATION_CONFIDENCE: f64 = 0.85;

/// Query correction and expansion with memoization.
pub struct CorrectionEngine {
    corrector: TypoCorrector,
    thesaurus: Arc<dyn ThesaurusProvider>,
    config: PreprocessConfig,
    correction_memo: Mutex<LruCache<String, CorrectionResult>>,
    synonym_memo: Mutex<LruCache<(String, String), SynonymResult>>,
}

impl CorrectionEngine {
    /// Create an engine with the built-in vocabulary and thesaurus, merged
    /// with the configured thesaurus file when it exists.
    pub fn new(config: PreprocessConfig) -> PreprocessResult<Self> {
        let mut thesaurus = if config.synonyms.use_builtin_thesaurus {
            StaticThesaurus::builtin()
        } else {
            StaticThesaurus::new()
        };

        if let Some(ref path) = config.synonyms.thesaurus_path {
            if path.exists() {
                let custom = StaticThesaurus::from_toml_file(path)?;
                log::info!(
                    "Loaded {} thesaurus entries from {}",
                    custom.len(),
                    path.display()
                );
                thesaurus.merge(&custom);
            } else {
                log::warn!("Thesaurus file not found: {}", path.display());
            }
        }

        let corrector = TypoCorrector::new(config.correction.clone());
        Ok(Self::with_components(corrector, Arc::new(thesaurus), config))
    }

    /// Create an engine around an existing corrector and thesaurus provider
    pub fn with_components(
        corrector: TypoCorrector,
        thesaurus: Arc<dyn ThesaurusProvider>,
        config: PreprocessConfig,
    ) -> Self {
        let correction_memo = Mutex::new(LruCache::new(capacity(config.correction.memo_capacity)));
        let synonym_memo = Mutex::new(LruCache::new(capacity(config.synonyms.memo_capacity)));

        Self {
            corrector,
            thesaurus,
            config,
            correction_memo,
            synonym_memo,
        }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    pub fn default_language(&self) -> &str {
        &self.config.synonyms.default_language
    }

    pub fn corrector(&self) -> &TypoCorrector {
        &self.corrector
    }

    /// Mutable access for runtime vocabulary changes; clears the memos so no
    /// stale correction is served afterwards.
    pub fn corrector_mut(&mut self) -> &mut TypoCorrector {
        self.clear_caches();
        &mut self.corrector
    }

    /// Correct a query, memoized per input text.
    pub fn correct_query(&self, query: &str) -> PreprocessResult<CorrectionResult> {
        if let Some(hit) = self
            .correction_memo
            .lock()
            .map_err(|_| PreprocessError::MemoPoisoned("correction"))?
            .get(query)
        {
            return Ok(hit.clone());
        }

        let result = self.corrector.correct_query(query);

        self.correction_memo
            .lock()
            .map_err(|_| PreprocessError::MemoPoisoned("correction"))?
            .put(query.to_string(), result.clone());

        Ok(result)
    }

    /// Ranked synonyms for a term, memoized per (term, language).
    ///
    /// `language` may name a subject area instead of a language, in which
    /// case that area's entries rank first. A thesaurus failure is logged
    /// and only the built-in adjacency table is used; such degraded results
    /// are not memoized.
    pub async fn find_synonyms(&self, term: &str, language: &str) -> PreprocessResult<SynonymResult> {
        let term = term.trim().to_lowercase();
        let key = (term.clone(), language.trim().to_lowercase());

        if let Some(hit) = self
            .synonym_memo
            .lock()
            .map_err(|_| PreprocessError::MemoPoisoned("synonym"))?
            .get(&key)
        {
            return Ok(hit.clone());
        }

        let default_language = self.default_language().to_string();
        let scope = LookupScope::resolve(language, &default_language, &self.thesaurus.subject_areas());

        let mut candidates = Vec::new();
        let mut degraded = false;

        match self.thesaurus.lookup(&term).await {
            Ok(matches) => {
                candidates.extend(matches.into_iter().map(|m| Candidate {
                    entry: SynonymEntry {
                        term: m.term,
                        relation: m.relation,
                        language: default_language.clone(),
                        confidence: m.confidence,
                    },
                    area: Some(m.area),
                }));
            }
            Err(e) => {
                log::warn!("Thesaurus lookup failed for '{}': {}", term, e);
                degraded = true;
            }
        }

        if scope.language != default_language {
            match self.thesaurus.translations(&term, &scope.language).await {
                Ok(translations) => {
                    candidates.extend(translations.into_iter().map(|t| Candidate {
                        entry: SynonymEntry {
                            term: t,
                            relation: SynonymRelation::Exact,
                            language: scope.language.clone(),
                            confidence: TRANSLATION_CONFIDENCE,
                        },
                        area: None,
                    }));
                }
                Err(e) => {
                    log::warn!(
                        "Translation lookup failed for '{}' ({}): {}",
                        term,
                        scope.language,
                        e
                    );
                    degraded = true;
                }
            }
        }

        candidates.extend(semantic_adjacency(&term).iter().map(|(adjacent, confidence)| {
            Candidate {
                entry: SynonymEntry {
                    term: adjacent.to_string(),
                    relation: SynonymRelation::Related,
                    language: default_language.clone(),
                    confidence: *confidence,
                },
                area: None,
            }
        }));

        let result = rank_synonyms(
            &term,
            candidates,
            scope.area.as_deref(),
            self.config.synonyms.max_results,
        );

        if !degraded {
            self.synonym_memo
                .lock()
                .map_err(|_| PreprocessError::MemoPoisoned("synonym"))?
                .put(key, result.clone());
        }

        Ok(result)
    }

    /// Alternate phrasings of a query.
    ///
    /// The unmodified query always comes first. Each token long enough to
    /// correct contributes one variant with its top synonym substituted, if
    /// that synonym clears the expansion threshold. Variants are
    /// de-duplicated and capped.
    pub async fn expand_query(&self, query: &str, language: &str) -> PreprocessResult<Vec<String>> {
        let max_variants = self.config.synonyms.max_variants;
        let mut variants = vec![query.to_string()];
        if !self.config.synonyms.enabled || max_variants <= 1 {
            variants.truncate(max_variants.max(1));
            return Ok(variants);
        }

        let tokens: Vec<&str> = query.split_whitespace().collect();
        for (position, token) in tokens.iter().enumerate() {
            if variants.len() >= max_variants {
                break;
            }
            if token.chars().count() < self.config.correction.min_token_length {
                continue;
            }

            let synonyms = self.find_synonyms(token, language).await?;
            if let Some(top) = synonyms.top(self.config.synonyms.expansion_threshold) {
                let mut replaced = tokens.clone();
                replaced[position] = top.term.as_str();
                let variant = replaced.join(" ");
                if !variants.contains(&variant) {
                    variants.push(variant);
                }
            }
        }

        Ok(variants)
    }

    /// Drop every memoized correction and synonym result
    pub fn clear_caches(&self) {
        if let Ok(mut memo) = self.correction_memo.lock() {
            memo.clear();
        }
        if let Ok(mut memo) = self.synonym_memo.lock() {
            memo.clear();
        }
        log::debug!("Cleared correction and synonym memos");
    }

    /// Entries currently memoized: (corrections, synonym results)
    pub fn memo_sizes(&self) -> (usize, usize) {
        let corrections = self.correction_memo.lock().map(|m| m.len()).unwrap_or(0);
        let synonyms = self.synonym_memo.lock().map(|m| m.len()).unwrap_or(0);
        (corrections, synonyms)
    }
}

fn capacity(requested: usize) -> NonZeroUsize {
    NonZeroUsize::new(requested).unwrap_or(NonZeroUsize::MIN)
}
