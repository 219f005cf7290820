//! Typo Correction
//!
//! Corrects query tokens against a civic-legislation vocabulary in three
//! stages, first match wins:
//! 1. Exact lookup in the known-typo and colloquial tables
//! 2. Fuzzy match by normalized Levenshtein similarity
//! 3. Phonetic match by Soundex-style code
//!
//! Fuzzy candidates come from a length-bucket index and phonetic candidates
//! from a code-bucket index, so per-token cost does not grow with a linear
//! scan of the vocabulary.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::config::CorrectionConfig;
use super::phonetic::PhoneticIndex;

// ============================================================================
// Types
// ============================================================================

/// How a token was corrected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrectionKind {
    /// Known typo or close edit-distance match
    Typo,
    /// Same phonetic code as a vocabulary word
    Phonetic,
    /// Colloquial or abbreviated form replaced by its formal term
    SynonymContext,
}

/// A correction applied to a single token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenCorrection {
    /// Word as it appeared in the query
    pub original: String,
    /// Replacement word
    pub corrected: String,
    pub kind: CorrectionKind,
    /// Confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Index of the token in the whitespace-split query
    pub position: usize,
}

/// Correction result for a complete query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionResult {
    pub original_query: String,
    pub corrected_query: String,
    /// Per-token corrections in query order
    pub corrections: Vec<TokenCorrection>,
    /// Mean of correction confidences, 1.0 when nothing changed
    pub confidence: f64,
}

impl CorrectionResult {
    /// A result that leaves the query as it is
    pub fn unchanged(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            original_query: query.clone(),
            corrected_query: query,
            corrections: Vec::new(),
            confidence: 1.0,
        }
    }

    fn from_corrections(
        original_query: String,
        corrected_query: String,
        corrections: Vec<TokenCorrection>,
    ) -> Self {
        let confidence = if corrections.is_empty() {
            1.0
        } else {
            let sum: f64 = corrections.iter().map(|c| c.confidence).sum();
            (sum / corrections.len() as f64).clamp(0.0, 1.0)
        };

        Self {
            original_query,
            corrected_query,
            corrections,
            confidence,
        }
    }

    pub fn has_corrections(&self) -> bool {
        !self.corrections.is_empty()
    }

    /// "Did you mean" text for a UI, when anything was corrected
    pub fn summary(&self) -> Option<String> {
        self.has_corrections()
            .then(|| format!("Showing results for \"{}\"", self.corrected_query))
    }
}

/// Normalized Levenshtein similarity: `1 - distance / max(len)`, in characters
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - strsim::levenshtein(a, b) as f64 / max_len as f64
}

// ============================================================================
// Typo Corrector
// ============================================================================

/// Civic-vocabulary spell corrector
pub struct TypoCorrector {
    config: CorrectionConfig,
    vocabulary: HashSet<String>,
    /// Vocabulary grouped by character length, each bucket sorted
    length_buckets: BTreeMap<usize, Vec<String>>,
    phonetic: PhoneticIndex,
    /// Misspelling → correct spelling
    known_typos: HashMap<String, String>,
    /// Colloquial or abbreviated form → formal term
    colloquial: HashMap<String, String>,
    /// Words that should never be corrected
    protected_words: HashSet<String>,
}

impl TypoCorrector {
    /// Corrector with the built-in civic vocabulary and typo tables
    pub fn new(config: CorrectionConfig) -> Self {
        let mut corrector = Self::new_empty(config);
        corrector.load_legislative_vocabulary();
        corrector.load_policy_vocabulary();
        corrector.load_government_vocabulary();
        corrector.load_common_english();
        corrector.load_known_typos();
        corrector.load_colloquial_terms();

        let extra = corrector.config.extra_vocabulary.clone();
        for word in extra {
            corrector.add_word(&word);
        }
        corrector
    }

    /// Corrector with no vocabulary beyond the configured extras
    pub fn new_empty(config: CorrectionConfig) -> Self {
        let protected_words = config
            .protected_words
            .iter()
            .map(|w| w.to_lowercase())
            .collect();

        Self {
            config,
            vocabulary: HashSet::new(),
            length_buckets: BTreeMap::new(),
            phonetic: PhoneticIndex::new(),
            known_typos: HashMap::new(),
            colloquial: HashMap::new(),
            protected_words,
        }
    }

    pub fn config(&self) -> &CorrectionConfig {
        &self.config
    }

    /// Add a word to the vocabulary and both candidate indexes
    pub fn add_word(&mut self, word: &str) {
        let word = word.trim().to_lowercase();
        if word.is_empty() || !self.vocabulary.insert(word.clone()) {
            return;
        }

        let bucket = self
            .length_buckets
            .entry(word.chars().count())
            .or_default();
        if let Err(pos) = bucket.binary_search(&word) {
            bucket.insert(pos, word.clone());
        }
        self.phonetic.insert(&word);
    }

    pub fn add_known_typo(&mut self, typo: &str, correction: &str) {
        self.add_word(correction);
        self.known_typos
            .insert(typo.to_lowercase(), correction.to_lowercase());
    }

    pub fn add_colloquial(&mut self, term: &str, formal: &str) {
        self.colloquial
            .insert(term.to_lowercase(), formal.to_lowercase());
    }

    pub fn add_protected_word(&mut self, word: &str) {
        self.protected_words.insert(word.to_lowercase());
    }

    pub fn is_protected(&self, word: &str) -> bool {
        self.protected_words.contains(&word.to_lowercase())
    }

    pub fn is_known(&self, word: &str) -> bool {
        self.vocabulary.contains(&word.to_lowercase())
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Correct a single word, or `None` when it should pass through.
    ///
    /// Words that are short, purely numeric, in the vocabulary or protected
    /// are never corrected.
    pub fn correct_word(&self, word: &str) -> Option<(String, CorrectionKind, f64)> {
        let word = word.to_lowercase();

        if word.chars().count() < self.config.min_token_length
            || word.chars().all(|c| c.is_ascii_digit())
            || self.vocabulary.contains(&word)
            || self.protected_words.contains(&word)
        {
            return None;
        }

        let known_confidence = self.config.known_typo_confidence.clamp(0.0, 1.0);
        if let Some(correction) = self.known_typos.get(&word) {
            return Some((correction.clone(), CorrectionKind::Typo, known_confidence));
        }
        if let Some(formal) = self.colloquial.get(&word) {
            return Some((formal.clone(), CorrectionKind::SynonymContext, known_confidence));
        }

        if let Some((candidate, score)) = self.fuzzy_match(&word) {
            return Some((candidate.to_string(), CorrectionKind::Typo, score));
        }

        self.phonetic.best_match(&word).map(|candidate| {
            (
                candidate.to_string(),
                CorrectionKind::Phonetic,
                self.config.phonetic_confidence.clamp(0.0, 1.0),
            )
        })
    }

    /// Best vocabulary word scoring strictly above the fuzzy threshold.
    ///
    /// Only length buckets that can reach the threshold are examined,
    /// nearest lengths first, up to `max_fuzzy_candidates` comparisons.
    fn fuzzy_match(&self, word: &str) -> Option<(&str, f64)> {
        let threshold = self.config.fuzzy_threshold;
        let len = word.chars().count();

        let lo = (len as f64 * threshold).floor().max(0.0) as usize;
        let hi = if threshold > 0.0 {
            (len as f64 / threshold).ceil() as usize
        } else {
            usize::MAX
        };

        let mut lengths: Vec<usize> = self
            .length_buckets
            .range(lo..=hi)
            .map(|(&candidate_len, _)| candidate_len)
            .filter(|&candidate_len| {
                let best_possible = 1.0
                    - len.abs_diff(candidate_len) as f64 / len.max(candidate_len) as f64;
                best_possible > threshold
            })
            .collect();
        lengths.sort_by_key(|&candidate_len| (len.abs_diff(candidate_len), candidate_len));

        let mut examined = 0;
        let mut best: Option<(&str, f64)> = None;
        for candidate_len in lengths {
            let Some(bucket) = self.length_buckets.get(&candidate_len) else {
                continue;
            };
            for candidate in bucket {
                if examined >= self.config.max_fuzzy_candidates {
                    return best;
                }
                examined += 1;

                let score = similarity(word, candidate);
                if score > threshold && best.map_or(true, |(_, b)| score > b) {
                    best = Some((candidate.as_str(), score));
                }
            }
        }
        best
    }

    /// Correct every token of a query.
    ///
    /// Leading and trailing punctuation on a token is kept around the
    /// corrected word. Tokens are re-joined with single spaces.
    pub fn correct_query(&self, query: &str) -> CorrectionResult {
        if !self.config.enabled {
            return CorrectionResult::unchanged(query);
        }

        let mut corrections = Vec::new();
        let mut tokens = Vec::new();

        for (position, token) in query.split_whitespace().enumerate() {
            let (prefix, core, suffix) = split_affixes(token);

            match self.correct_word(core) {
                Some((corrected, kind, confidence)) => {
                    tokens.push(format!("{}{}{}", prefix, corrected, suffix));
                    corrections.push(TokenCorrection {
                        original: core.to_string(),
                        corrected,
                        kind,
                        confidence,
                        position,
                    });
                }
                None => tokens.push(token.to_string()),
            }
        }

        if corrections.is_empty() {
            return CorrectionResult::unchanged(query);
        }

        CorrectionResult::from_corrections(query.to_string(), tokens.join(" "), corrections)
    }

    // ========================================================================
    // Built-in tables
    // ========================================================================

    /// Bill lifecycle and legislative process terms
    fn load_legislative_vocabulary(&mut self) {
        let terms = [
            "bill", "bills", "act", "amendment", "amendments", "appropriations", "ballot",
            "caucus", "chamber", "committee", "committees", "comment", "comments", "congress",
            "cosponsor", "enacted", "filibuster", "floor", "hearing", "hearings",
            "introduced", "law", "laws", "legislation", "legislative", "legislature",
            "markup", "measure", "motion", "ordinance", "passed", "pending", "proposal",
            "quorum", "reading", "referendum", "reform", "reforms", "repeal", "resolution",
            "session", "signed", "sponsor", "sponsors", "statute", "status", "subcommittee",
            "testimony", "veto", "vetoed", "vote", "votes", "voting",
        ];

        for term in terms {
            self.add_word(term);
        }
    }

    /// Policy areas that bills are filed under
    fn load_policy_vocabulary(&mut self) {
        let terms = [
            // Health
            "health", "healthcare", "hospital", "hospitals", "insurance", "medicaid",
            "medicare", "medical", "mental", "opioid", "prescription", "drug", "drugs",
            "care", "affordable",
            // Education
            "education", "educational", "school", "schools", "student", "students",
            "teacher", "teachers", "tuition", "university", "college", "institution",
            "curriculum", "literacy", "funding",
            // Economy
            "budget", "deficit", "economic", "economy", "employment", "unemployment",
            "finance", "labor", "minimum", "revenue", "spending", "tax", "taxes", "wage",
            "wages", "business", "small", "pension", "retirement", "welfare", "benefits",
            // Infrastructure and environment
            "infrastructure", "transportation", "transit", "highway", "bridge", "road",
            "roads", "broadband", "internet", "energy", "climate", "environment",
            "environmental", "pollution", "conservation", "water", "wildlife", "parks",
            "housing", "zoning", "rent",
            // Justice and rights
            "justice", "criminal", "court", "courts", "police", "policing", "prison",
            "firearm", "firearms", "gun", "guns", "civil", "rights", "privacy", "security",
            "safety", "immigration", "veterans", "disability", "accessibility", "seniors",
            "children", "family", "families", "defense", "license", "program", "programs",
            "center", "technology", "data", "agriculture", "farm", "food",
        ];

        for term in terms {
            self.add_word(term);
        }
    }

    /// Offices, bodies and jurisdictions
    fn load_government_vocabulary(&mut self) {
        let terms = [
            "government", "federal", "state", "county", "city", "municipal", "local",
            "district", "senate", "senator", "senators", "house", "assembly",
            "representative", "representatives", "governor", "mayor", "council",
            "commission", "agency", "department", "administration", "election",
            "elections", "campaign", "lobbying", "ethics", "transparency", "public",
            "citizens", "community", "policy", "regulation", "regulations",
        ];

        for term in terms {
            self.add_word(term);
        }
    }

    /// Common English words, so ordinary query words are left alone
    fn load_common_english(&mut self) {
        let words = [
            "the", "and", "for", "with", "from", "about", "into", "over", "under", "after",
            "before", "between", "against", "all", "any", "each", "more", "most", "new",
            "not", "only", "other", "some", "than", "that", "this", "these", "those",
            "what", "which", "who", "how", "when", "where", "why", "are", "was", "were",
            "has", "have", "had", "can", "will", "would", "should", "could", "may", "must",
            "use", "make", "made", "help", "need", "pay", "plan", "plans", "act", "year",
            "years", "people", "work", "workers", "access", "cost", "costs", "fund",
            "funds", "free", "fair", "open", "rural", "urban", "national", "protection",
            "relief", "support", "services", "service", "development", "standards",
        ];

        for word in words {
            self.add_word(word);
        }
    }

    /// Misspellings seen in civic search logs
    fn load_known_typos(&mut self) {
        let typos = [
            ("goverment", "government"),
            ("govenment", "government"),
            ("governmnet", "government"),
            ("legistlation", "legislation"),
            ("legislaton", "legislation"),
            ("buget", "budget"),
            ("budjet", "budget"),
            ("educaton", "education"),
            ("eduction", "education"),
            ("enviroment", "environment"),
            ("enviornment", "environment"),
            ("infastructure", "infrastructure"),
            ("infrastucture", "infrastructure"),
            ("imigration", "immigration"),
            ("immigraton", "immigration"),
            ("transporation", "transportation"),
            ("amendmant", "amendment"),
            ("ammendment", "amendment"),
            ("comittee", "committee"),
            ("committe", "committee"),
            ("represenative", "representative"),
            ("appropiations", "appropriations"),
            ("medicaide", "medicaid"),
            ("housng", "housing"),
            ("polution", "pollution"),
            ("privicy", "privacy"),
            ("saftey", "safety"),
            ("secuirty", "security"),
            ("veterens", "veterans"),
            ("elecion", "election"),
            ("accessability", "accessibility"),
            ("unemployement", "unemployment"),
            ("retirment", "retirement"),
            ("wellfare", "welfare"),
            ("municiple", "municipal"),
            ("ordinence", "ordinance"),
            ("sponser", "sponsor"),
            ("sponsers", "sponsors"),
            // British spellings
            ("defence", "defense"),
            ("licence", "license"),
            ("labour", "labor"),
            ("programme", "program"),
            ("centre", "center"),
        ];

        for (typo, correction) in typos {
            self.add_known_typo(typo, correction);
        }
    }

    /// Informal names for formal policy terms
    fn load_colloquial_terms(&mut self) {
        let terms = [
            ("obamacare", "affordable care act"),
            ("gov", "government"),
            ("govt", "government"),
            ("edu", "education"),
            ("infra", "infrastructure"),
            ("approps", "appropriations"),
            ("enviro", "environment"),
            ("immig", "immigration"),
        ];

        for (term, formal) in terms {
            self.add_colloquial(term, formal);
        }
    }
}

impl Default for TypoCorrector {
    fn default() -> Self {
        Self::new(CorrectionConfig::default())
    }
}

/// Split a token into leading punctuation, the word, and trailing punctuation
fn split_affixes(token: &str) -> (&str, &str, &str) {
    let start = token
        .find(|c: char| c.is_alphanumeric())
        .unwrap_or(token.len());
    let end = token
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphanumeric())
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(start);
    (&token[..start], &token[start..end], &token[end..])
}
