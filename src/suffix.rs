//! Suffix inventories.
//!
//! Every trailing substring of up to half a word's length is a suffix
//! candidate, weighted by the frequency of the word it came from. Only the
//! top-K candidates longer than one character take part in morphological noise
//! and in the morphological posterior, so the inventory is built the same way
//! on both sides.
//!
//! Half a word rounds down: a 7-letter word yields 3 candidates and a
//! 3-letter word yields 1, so a suffix never covers the middle character.

use crate::vocab::Vocabulary;
use ahash::{AHashMap, AHashSet};

/// Trailing substrings of `word` of length `1..=len/2`, shortest first.
pub fn candidate_suffixes(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    (1..=chars.len() / 2)
        .map(|i| chars[chars.len() - i..].iter().collect())
        .collect()
}

/// The last `n` characters of `word` (the whole word if it is shorter).
pub fn last_chars(word: &str, n: usize) -> String {
    let chars: Vec<char> = word.chars().collect();
    chars[chars.len().saturating_sub(n)..].iter().collect()
}

/// Suffix -> summed frequency of the words carrying it.
pub fn suffix_frequencies(vocab: &Vocabulary) -> AHashMap<String, u64> {
    let mut freq = AHashMap::new();
    for (word, count) in vocab.iter() {
        for suffix in candidate_suffixes(word) {
            *freq.entry(suffix).or_insert(0) += count;
        }
    }
    freq
}

/// The top-K most frequent suffixes of a vocabulary.
#[derive(Debug, Clone, Default)]
pub struct SuffixInventory {
    ranked: Vec<(String, u64)>,
    members: AHashSet<String>,
}

impl SuffixInventory {
    /// Keep the `k` most frequent suffixes longer than one character. Ties are
    /// broken by suffix order so the inventory is stable.
    pub fn build(vocab: &Vocabulary, k: usize) -> Self {
        let mut ranked: Vec<(String, u64)> = suffix_frequencies(vocab)
            .into_iter()
            .filter(|(suffix, _)| suffix.chars().count() > 1)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(k);

        let members = ranked.iter().map(|(s, _)| s.clone()).collect();
        Self { ranked, members }
    }

    pub fn contains(&self, suffix: &str) -> bool {
        self.members.contains(suffix)
    }

    /// Suffixes by descending frequency.
    pub fn ranked(&self) -> &[(String, u64)] {
        &self.ranked
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }
}
