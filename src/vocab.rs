//! Vocabulary construction from raw text corpora.
//!
//! A corpus is plain UTF-8 text, one sentence per line, whitespace tokenized.
//! Every token is stripped of surrounding punctuation, filtered, lowercased and
//! counted:
//!
//! ```text
//! The cat sat.   ->  the: 1, cat: 1, sat: 1
//! The cat!       ->  the: 2, cat: 2, sat: 1
//! ```
//!
//! Two filters exist. Noiser vocabularies only keep fully alphabetic tokens
//! after stripping `.,!?`. Lexicon-side vocabularies used by the posterior
//! estimator strip a much wider punctuation set and only drop tokens that
//! contain digits.

use crate::error::{NoiseError, Result};
use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Punctuation stripped from noiser corpus tokens.
pub const NOISER_PUNCTUATION: &[char] = &['.', ',', '!', '?'];

/// Punctuation and invisible characters stripped from lexicon-side corpus tokens.
pub const LEXICON_PUNCTUATION: &[char] = &[
    '»', '«', '.', ',', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '`', ':', ';', '/',
    '\\', '-', '–', '—', '~', '_', '<', '>', '|', '@', '#', '$', '%', '^', '&', '*', '+', '=',
    '\u{200b}', '\u{200c}', '\u{200d}', '\u{200e}', '\u{200f}',
];

/// Which tokens a vocabulary keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabFilter {
    /// Strip `.,!?`, keep only fully alphabetic tokens.
    Alphabetic,
    /// Strip the wide punctuation set, drop tokens containing digits.
    NoDigits,
}

impl VocabFilter {
    /// Normalize a raw token, returning `None` if it should be discarded.
    pub fn normalize(self, token: &str) -> Option<String> {
        match self {
            VocabFilter::Alphabetic => {
                let word = token.trim_matches(NOISER_PUNCTUATION);
                if word.is_empty() || !word.chars().all(char::is_alphabetic) {
                    return None;
                }
                Some(word.to_lowercase())
            }
            VocabFilter::NoDigits => {
                let word = token.trim_matches(LEXICON_PUNCTUATION);
                if word.is_empty() || word.chars().any(char::is_numeric) {
                    return None;
                }
                Some(word.to_lowercase())
            }
        }
    }
}

/// Word frequency map built once from a corpus.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    counts: AHashMap<String, u64>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary from a corpus file.
    ///
    /// # Errors
    /// Returns `CorpusRead` if the file cannot be opened or is not valid UTF-8.
    pub fn from_path(path: &Path, filter: VocabFilter) -> Result<Self> {
        info!(path = %path.display(), "building vocabulary");
        let file = File::open(path).map_err(|e| NoiseError::corpus_read(path, e))?;
        let reader = BufReader::new(file);

        let mut vocab = Self::new();
        for line in reader.lines() {
            let line = line.map_err(|e| NoiseError::corpus_read(path, e))?;
            vocab.add_line(&line, filter);
        }

        info!(words = vocab.len(), "vocabulary built");
        Ok(vocab)
    }

    /// Build a vocabulary from in-memory lines.
    pub fn from_lines<'a, I>(lines: I, filter: VocabFilter) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut vocab = Self::new();
        for line in lines {
            vocab.add_line(line, filter);
        }
        vocab
    }

    fn add_line(&mut self, line: &str, filter: VocabFilter) {
        for token in line.split_whitespace() {
            if let Some(word) = filter.normalize(token) {
                self.insert(word, 1);
            }
        }
    }

    /// Add `count` occurrences of `word` (taken as already normalized).
    pub fn insert(&mut self, word: String, count: u64) {
        *self.counts.entry(word).or_insert(0) += count;
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    pub fn count(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(w, c)| (w.as_str(), *c))
    }

    /// Words in lexicographic order. Every random draw over a vocabulary goes
    /// through this so that a fixed seed reproduces the same maps.
    pub fn sorted_words(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.counts.keys().map(String::as_str).collect();
        words.sort_unstable();
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_alphabetic_filter() {
        let vocab = Vocabulary::from_lines(
            ["The cat sat.", "the cat, the dog! x1 well-known"],
            VocabFilter::Alphabetic,
        );
        assert_eq!(vocab.count("the"), 3);
        assert_eq!(vocab.count("cat"), 2);
        assert_eq!(vocab.count("dog"), 1);
        assert!(!vocab.contains("x1"));
        assert!(!vocab.contains("well-known"));
    }

    #[test]
    fn test_no_digit_filter() {
        let vocab = Vocabulary::from_lines(
            ["«Hallo» (welt) well-known 2024 a1 --"],
            VocabFilter::NoDigits,
        );
        assert!(vocab.contains("hallo"));
        assert!(vocab.contains("welt"));
        assert!(vocab.contains("well-known"));
        assert!(!vocab.contains("2024"));
        assert!(!vocab.contains("a1"));
        assert!(!vocab.contains(""));
        assert_eq!(vocab.len(), 3);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hello world").unwrap();
        writeln!(file, "Hello again").unwrap();

        let vocab = Vocabulary::from_path(file.path(), VocabFilter::Alphabetic).unwrap();
        assert_eq!(vocab.count("hello"), 2);
        assert_eq!(vocab.sorted_words(), vec!["again", "hello", "world"]);
    }

    #[test]
    fn test_missing_corpus() {
        let err = Vocabulary::from_path(Path::new("/nonexistent/corpus.txt"), VocabFilter::Alphabetic)
            .unwrap_err();
        assert!(matches!(err, NoiseError::CorpusRead { .. }));
    }
}
