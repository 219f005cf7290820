//! Phonetic Codes
//!
//! Soundex-style codes and a bucket index over them, so phonetic candidates
//! are found by a single hash lookup instead of a vocabulary scan.

use std::collections::HashMap;

/// Four-character phonetic code: the first letter uppercased followed by
/// three digits.
///
/// Only ASCII letters are considered. Vowels and `y` separate repeated
/// consonant classes; `h` and `w` do not. Returns `None` when the word has
/// no ASCII letters.
pub fn phonetic_code(word: &str) -> Option<String> {
    let mut letters = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase());

    let first = letters.next()?;
    let mut code = String::with_capacity(4);
    code.push(first.to_ascii_uppercase());

    let mut previous = class_of(first);
    for c in letters {
        if code.len() == 4 {
            break;
        }
        match c {
            'h' | 'w' => continue,
            'a' | 'e' | 'i' | 'o' | 'u' | 'y' => previous = 0,
            _ => {
                let class = class_of(c);
                if class != previous {
                    code.push(char::from(b'0' + class));
                }
                previous = class;
            }
        }
    }

    while code.len() < 4 {
        code.push('0');
    }
    Some(code)
}

fn class_of(c: char) -> u8 {
    match c {
        'b' | 'f' | 'p' | 'v' => 1,
        'c' | 'g' | 'j' | 'k' | 'q' | 's' | 'x' | 'z' => 2,
        'd' | 't' => 3,
        'l' => 4,
        'm' | 'n' => 5,
        'r' => 6,
        _ => 0,
    }
}

/// Vocabulary words bucketed by phonetic code
#[derive(Debug, Clone, Default)]
pub struct PhoneticIndex {
    buckets: HashMap<String, Vec<String>>,
}

impl PhoneticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word to its bucket; words without a code are ignored.
    pub fn insert(&mut self, word: &str) {
        let Some(code) = phonetic_code(word) else {
            return;
        };
        let bucket = self.buckets.entry(code).or_default();
        if let Err(pos) = bucket.binary_search_by(|w| w.as_str().cmp(word)) {
            bucket.insert(pos, word.to_string());
        }
    }

    /// Words sharing `word`'s code, excluding `word` itself
    pub fn candidates<'a>(&'a self, word: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        phonetic_code(word)
            .and_then(|code| self.buckets.get(&code))
            .into_iter()
            .flatten()
            .map(String::as_str)
            .filter(move |candidate| *candidate != word)
    }

    /// Closest same-sounding word: fewest edits, then alphabetical
    pub fn best_match<'a>(&'a self, word: &'a str) -> Option<&'a str> {
        self.candidates(word)
            .min_by_key(|candidate| (strsim::levenshtein(word, candidate), *candidate))
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
