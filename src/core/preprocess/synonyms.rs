//! Synonym Lookup for Civic Search
//!
//! A domain thesaurus keyed by subject area, with reverse lookups, a small
//! multilingual table, and a built-in semantic-adjacency table. Lookups go
//! through the [`ThesaurusProvider`] trait so an external service can stand
//! in for the static tables.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::error::{PreprocessError, PreprocessResult};

// ============================================================================
// Types
// ============================================================================

/// How a synonym relates to the source term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SynonymRelation {
    /// Interchangeable
    Exact,
    /// Topically close
    #[default]
    Related,
    /// More general than the source term
    Broader,
    /// More specific than the source term
    Narrower,
}

impl SynonymRelation {
    /// Relation seen from the other side
    pub fn inverse(self) -> Self {
        match self {
            SynonymRelation::Broader => SynonymRelation::Narrower,
            SynonymRelation::Narrower => SynonymRelation::Broader,
            other => other,
        }
    }
}

/// One ranked synonym
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub term: String,
    pub relation: SynonymRelation,
    pub language: String,
    /// Confidence (0.0 - 1.0)
    pub confidence: f64,
}

/// Ranked synonyms for one term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynonymResult {
    pub source_term: String,
    pub synonyms: Vec<SynonymEntry>,
}

impl SynonymResult {
    pub fn empty(source_term: impl Into<String>) -> Self {
        Self {
            source_term: source_term.into(),
            synonyms: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }

    /// Highest-ranked synonym scoring strictly above `threshold`
    pub fn top(&self, threshold: f64) -> Option<&SynonymEntry> {
        self.synonyms.iter().find(|s| s.confidence > threshold)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.synonyms.iter().map(|s| s.term.as_str())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms().any(|t| t == term)
    }
}

/// A thesaurus hit, tagged with the subject area it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ThesaurusMatch {
    pub area: String,
    pub term: String,
    pub relation: SynonymRelation,
    pub confidence: f64,
}

/// Where a lookup should look: which language, and optionally which
/// subject area to rank first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupScope {
    pub language: String,
    pub area: Option<String>,
}

impl LookupScope {
    /// Interpret a caller's language argument.
    ///
    /// A value naming a subject area (`"education"` or `"education-domain"`)
    /// selects that area in the default language; anything else is a
    /// language code. Empty means the default language.
    pub fn resolve(requested: &str, default_language: &str, areas: &[String]) -> Self {
        let requested = requested.trim().to_lowercase();
        if requested.is_empty() {
            return Self {
                language: default_language.to_string(),
                area: None,
            };
        }

        let area = requested.strip_suffix("-domain").unwrap_or(&requested);
        if areas.iter().any(|a| a == area) {
            return Self {
                language: default_language.to_string(),
                area: Some(area.to_string()),
            };
        }

        Self {
            language: requested,
            area: None,
        }
    }
}

// ============================================================================
// Thesaurus Provider
// ============================================================================

/// Source of domain synonyms
#[async_trait]
pub trait ThesaurusProvider: Send + Sync {
    /// Subject areas this thesaurus is organized by
    fn subject_areas(&self) -> Vec<String>;

    /// Forward and reverse matches for a term across all subject areas
    async fn lookup(&self, term: &str) -> PreprocessResult<Vec<ThesaurusMatch>>;

    /// Translations of a term into `language`
    async fn translations(&self, term: &str, language: &str) -> PreprocessResult<Vec<String>>;
}

#[derive(Debug, Clone, PartialEq)]
struct Target {
    term: String,
    relation: SynonymRelation,
    confidence: f64,
}

/// Reverse matches are slightly less trusted than forward ones
const REVERSE_CONFIDENCE_FACTOR: f64 = 0.9;

/// In-process thesaurus built from static tables or TOML
#[derive(Debug, Clone, Default)]
pub struct StaticThesaurus {
    /// area → source term → targets
    areas: BTreeMap<String, BTreeMap<String, Vec<Target>>>,
    /// target term → (area, source term, relation, confidence)
    reverse: HashMap<String, Vec<(String, String, SynonymRelation, f64)>>,
    /// language → term → translations
    translations: BTreeMap<String, HashMap<String, Vec<String>>>,
}

impl StaticThesaurus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from TOML configuration file.
    pub fn from_toml_file(path: &Path) -> PreprocessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from TOML string.
    ///
    /// Expected format:
    /// ```toml
    /// [areas.education]
    /// school = [
    ///     { term = "educational institution", relation = "exact", confidence = 0.9 },
    ///     { term = "academy" },
    /// ]
    ///
    /// [translations.es]
    /// school = ["escuela"]
    /// ```
    /// `relation` defaults to `related` and `confidence` to 0.8.
    pub fn from_toml_str(content: &str) -> PreprocessResult<Self> {
        #[derive(Deserialize)]
        struct TomlTarget {
            term: String,
            #[serde(default)]
            relation: SynonymRelation,
            #[serde(default = "default_confidence")]
            confidence: f64,
        }

        #[derive(Deserialize)]
        struct TomlThesaurus {
            #[serde(default)]
            areas: BTreeMap<String, BTreeMap<String, Vec<TomlTarget>>>,
            #[serde(default)]
            translations: BTreeMap<String, BTreeMap<String, Vec<String>>>,
        }

        fn default_confidence() -> f64 {
            0.8
        }

        let parsed: TomlThesaurus = toml::from_str(content)
            .map_err(|e| PreprocessError::SynonymParse(e.to_string()))?;

        let mut thesaurus = Self::new();
        for (area, entries) in parsed.areas {
            for (source, targets) in entries {
                for target in targets {
                    if !(0.0..=1.0).contains(&target.confidence) {
                        return Err(PreprocessError::SynonymParse(format!(
                            "confidence {} for '{}' -> '{}' is outside [0, 1]",
                            target.confidence, source, target.term
                        )));
                    }
                    thesaurus.add_entry(
                        &area,
                        &source,
                        &target.term,
                        target.relation,
                        target.confidence,
                    );
                }
            }
        }
        for (language, terms) in parsed.translations {
            for (term, translations) in terms {
                let translations: Vec<&str> = translations.iter().map(String::as_str).collect();
                thesaurus.add_translations(&language, &term, &translations);
            }
        }

        Ok(thesaurus)
    }

    /// Built-in civic thesaurus
    pub fn builtin() -> Self {
        use SynonymRelation::*;

        let mut thesaurus = Self::new();
        let areas: &[(&str, &[(&str, &[(&str, SynonymRelation, f64)])])] = &[
            (
                "education",
                &[
                    (
                        "school",
                        &[
                            ("educational institution", Exact, 0.9),
                            ("public school", Narrower, 0.75),
                            ("academy", Related, 0.7),
                        ],
                    ),
                    ("teacher", &[("educator", Exact, 0.9), ("instructor", Related, 0.75)]),
                    ("student", &[("pupil", Exact, 0.85), ("learner", Related, 0.7)]),
                    ("tuition", &[("tuition fees", Exact, 0.85), ("student fees", Related, 0.7)]),
                    ("university", &[("higher education", Broader, 0.8), ("college", Related, 0.75)]),
                    ("curriculum", &[("coursework", Related, 0.7)]),
                ],
            ),
            (
                "health",
                &[
                    (
                        "healthcare",
                        &[
                            ("health care", Exact, 0.95),
                            ("medical care", Exact, 0.85),
                            ("public health", Related, 0.65),
                        ],
                    ),
                    ("hospital", &[("medical center", Exact, 0.8)]),
                    ("insurance", &[("health coverage", Related, 0.7)]),
                    ("medicaid", &[("public health insurance", Broader, 0.7)]),
                ],
            ),
            (
                "finance",
                &[
                    ("budget", &[("spending plan", Exact, 0.8), ("appropriations", Related, 0.75)]),
                    ("tax", &[("levy", Exact, 0.8), ("revenue", Related, 0.6)]),
                    ("funding", &[("financing", Exact, 0.85), ("grants", Narrower, 0.65)]),
                    ("deficit", &[("shortfall", Exact, 0.8)]),
                ],
            ),
            (
                "transportation",
                &[
                    ("transit", &[("public transportation", Exact, 0.9), ("mass transit", Exact, 0.85)]),
                    ("highway", &[("roads", Broader, 0.7), ("interstate", Narrower, 0.7)]),
                ],
            ),
            (
                "environment",
                &[
                    ("climate", &[("climate change", Related, 0.75)]),
                    ("pollution", &[("contamination", Exact, 0.8), ("emissions", Related, 0.7)]),
                    ("conservation", &[("preservation", Exact, 0.8)]),
                ],
            ),
            (
                "justice",
                &[
                    ("police", &[("law enforcement", Exact, 0.9)]),
                    ("gun", &[("firearm", Exact, 0.9)]),
                    ("prison", &[("corrections", Related, 0.75), ("incarceration", Related, 0.7)]),
                ],
            ),
            (
                "housing",
                &[
                    ("housing", &[("affordable housing", Narrower, 0.7), ("residential", Related, 0.6)]),
                    ("rent", &[("tenancy", Related, 0.7)]),
                ],
            ),
            (
                "governance",
                &[
                    ("bill", &[("legislation", Broader, 0.8), ("measure", Exact, 0.8)]),
                    ("reform", &[("overhaul", Related, 0.7), ("amendment", Related, 0.65)]),
                    ("election", &[("ballot", Related, 0.7), ("vote", Related, 0.65)]),
                    ("lobbying", &[("advocacy", Related, 0.7)]),
                ],
            ),
        ];

        for (area, entries) in areas {
            for (source, targets) in entries.iter() {
                for (term, relation, confidence) in targets.iter() {
                    thesaurus.add_entry(area, source, term, *relation, *confidence);
                }
            }
        }

        let translations: &[(&str, &[(&str, &[&str])])] = &[
            (
                "es",
                &[
                    ("school", &["escuela"]),
                    ("education", &["educación"]),
                    ("healthcare", &["atención médica", "salud"]),
                    ("budget", &["presupuesto"]),
                    ("housing", &["vivienda"]),
                    ("immigration", &["inmigración"]),
                    ("bill", &["proyecto de ley"]),
                ],
            ),
            (
                "fr",
                &[
                    ("school", &["école"]),
                    ("education", &["éducation"]),
                    ("healthcare", &["soins de santé"]),
                    ("housing", &["logement"]),
                    ("bill", &["projet de loi"]),
                ],
            ),
        ];

        for (language, terms) in translations {
            for (term, words) in terms.iter() {
                thesaurus.add_translations(language, term, words);
            }
        }

        thesaurus
    }

    /// Add a forward entry (and its reverse) under a subject area
    pub fn add_entry(
        &mut self,
        area: &str,
        source: &str,
        target: &str,
        relation: SynonymRelation,
        confidence: f64,
    ) {
        let area = area.trim().to_lowercase();
        let source = source.trim().to_lowercase();
        let target = target.trim().to_lowercase();
        if source.is_empty() || target.is_empty() || source == target {
            return;
        }
        let confidence = confidence.clamp(0.0, 1.0);

        let targets = self
            .areas
            .entry(area.clone())
            .or_default()
            .entry(source.clone())
            .or_default();
        if targets.iter().any(|t| t.term == target) {
            return;
        }
        targets.push(Target {
            term: target.clone(),
            relation,
            confidence,
        });

        self.reverse
            .entry(target)
            .or_default()
            .push((area, source, relation, confidence));
    }

    pub fn add_translations(&mut self, language: &str, term: &str, translations: &[&str]) {
        let entry = self
            .translations
            .entry(language.trim().to_lowercase())
            .or_default()
            .entry(term.trim().to_lowercase())
            .or_default();
        for translation in translations {
            let translation = translation.trim().to_lowercase();
            if !translation.is_empty() && !entry.contains(&translation) {
                entry.push(translation);
            }
        }
    }

    /// Merge another thesaurus into this one; existing entries win.
    pub fn merge(&mut self, other: &StaticThesaurus) {
        for (area, entries) in &other.areas {
            for (source, targets) in entries {
                for target in targets {
                    self.add_entry(area, source, &target.term, target.relation, target.confidence);
                }
            }
        }
        for (language, terms) in &other.translations {
            for (term, words) in terms {
                let words: Vec<&str> = words.iter().map(String::as_str).collect();
                self.add_translations(language, term, &words);
            }
        }
    }

    /// Number of forward entries across all areas
    pub fn len(&self) -> usize {
        self.areas
            .values()
            .flat_map(|entries| entries.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matches(&self, term: &str) -> Vec<ThesaurusMatch> {
        let term = term.trim().to_lowercase();
        let mut matches = Vec::new();

        for (area, entries) in &self.areas {
            if let Some(targets) = entries.get(&term) {
                matches.extend(targets.iter().map(|t| ThesaurusMatch {
                    area: area.clone(),
                    term: t.term.clone(),
                    relation: t.relation,
                    confidence: t.confidence,
                }));
            }
        }

        if let Some(sources) = self.reverse.get(&term) {
            matches.extend(sources.iter().map(|(area, source, relation, confidence)| {
                ThesaurusMatch {
                    area: area.clone(),
                    term: source.clone(),
                    relation: relation.inverse(),
                    confidence: confidence * REVERSE_CONFIDENCE_FACTOR,
                }
            }));
        }

        matches
    }
}

#[async_trait]
impl ThesaurusProvider for StaticThesaurus {
    fn subject_areas(&self) -> Vec<String> {
        self.areas.keys().cloned().collect()
    }

    async fn lookup(&self, term: &str) -> PreprocessResult<Vec<ThesaurusMatch>> {
        Ok(self.matches(term))
    }

    async fn translations(&self, term: &str, language: &str) -> PreprocessResult<Vec<String>> {
        Ok(self
            .translations
            .get(&language.trim().to_lowercase())
            .and_then(|terms| terms.get(&term.trim().to_lowercase()))
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// Semantic Adjacency
// ============================================================================

/// Loosely related civic terms, independent of any thesaurus
pub fn semantic_adjacency(term: &str) -> &'static [(&'static str, f64)] {
    match term {
        "school" => &[("education", 0.65), ("classroom", 0.55)],
        "education" => &[("schools", 0.65), ("learning", 0.55)],
        "funding" => &[("appropriations", 0.6), ("budget", 0.55)],
        "budget" => &[("spending", 0.7), ("fiscal", 0.6)],
        "healthcare" => &[("health", 0.7), ("medicine", 0.55)],
        "reform" => &[("change", 0.5), ("revision", 0.6)],
        "housing" => &[("homes", 0.65), ("shelter", 0.55)],
        "climate" => &[("environment", 0.6), ("weather", 0.4)],
        "police" => &[("policing", 0.8), ("public safety", 0.6)],
        "transit" => &[("transportation", 0.75), ("commute", 0.5)],
        "vote" => &[("election", 0.65), ("ballot", 0.6)],
        _ => &[],
    }
}

// ============================================================================
// Ranking
// ============================================================================

/// A candidate synonym before ranking
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub entry: SynonymEntry,
    pub area: Option<String>,
}

/// Merge candidates into a ranked, de-duplicated, capped result.
///
/// Duplicates keep their highest confidence. Entries from `preferred_area`
/// rank first, then by confidence, then alphabetically. The source term
/// itself is never returned.
pub(crate) fn rank_synonyms(
    source_term: &str,
    candidates: Vec<Candidate>,
    preferred_area: Option<&str>,
    max_results: usize,
) -> SynonymResult {
    let mut best: HashMap<String, Candidate> = HashMap::new();
    for mut candidate in candidates {
        candidate.entry.term = candidate.entry.term.trim().to_lowercase();
        candidate.entry.confidence = candidate.entry.confidence.clamp(0.0, 1.0);
        if candidate.entry.term.is_empty() || candidate.entry.term == source_term {
            continue;
        }

        match best.get(&candidate.entry.term) {
            Some(existing) if existing.entry.confidence >= candidate.entry.confidence => {}
            _ => {
                best.insert(candidate.entry.term.clone(), candidate);
            }
        }
    }

    let mut ranked: Vec<Candidate> = best.into_values().collect();
    ranked.sort_by(|a, b| {
        let a_preferred = preferred_area.is_some() && a.area.as_deref() == preferred_area;
        let b_preferred = preferred_area.is_some() && b.area.as_deref() == preferred_area;
        b_preferred
            .cmp(&a_preferred)
            .then_with(|| b.entry.confidence.total_cmp(&a.entry.confidence))
            .then_with(|| a.entry.term.cmp(&b.entry.term))
    });
    ranked.truncate(max_results);

    SynonymResult {
        source_term: source_term.to_string(),
        synonyms: ranked.into_iter().map(|c| c.entry).collect(),
    }
}
