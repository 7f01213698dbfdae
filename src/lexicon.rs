//! Bilingual lexicons.
//!
//! On disk a lexicon is a JSON object from source word to either a single
//! target or a map of candidate targets to frequencies:
//!
//! ```text
//! { "casa": "casa", "perro": { "can": 12, "perro": 3 } }
//! ```
//!
//! Each source word is reduced to one best target. A source listed among its
//! own candidates maps to itself; otherwise the most frequent candidate wins and
//! ties go to the lexicographically smallest target.

use crate::error::{NoiseError, Result};
use ahash::AHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LexiconEntry {
    Single(String),
    Weighted(BTreeMap<String, f64>),
}

impl LexiconEntry {
    fn best_target(&self, source: &str) -> Option<String> {
        match self {
            LexiconEntry::Single(target) => Some(target.clone()),
            LexiconEntry::Weighted(candidates) => {
                if candidates.contains_key(source) {
                    return Some(source.to_string());
                }
                // BTreeMap iterates in key order, so the first maximum is the smallest key.
                let mut best: Option<(&String, f64)> = None;
                for (target, &freq) in candidates {
                    if best.map_or(true, |(_, top)| freq > top) {
                        best = Some((target, freq));
                    }
                }
                best.map(|(target, _)| target.clone())
            }
        }
    }
}

/// An ordered list of (source, best target) pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BilingualLexicon {
    pairs: Vec<(String, String)>,
}

impl BilingualLexicon {
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            pairs: pairs.into_iter().map(|(s, t)| (s.into(), t.into())).collect(),
        }
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        let entries: BTreeMap<String, LexiconEntry> = serde_json::from_str(raw)?;
        let mut pairs = Vec::with_capacity(entries.len());
        for (source, entry) in &entries {
            match entry.best_target(source) {
                Some(target) => pairs.push((source.clone(), target)),
                None => warn!(source = %source, "lexicon entry has no candidates, skipping"),
            }
        }
        Ok(Self { pairs })
    }

    /// Load a lexicon JSON file.
    ///
    /// # Errors
    /// Returns `CorpusRead` if the file is unreadable or not a lexicon object.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| NoiseError::corpus_read(path, e))?;
        let lexicon = Self::from_json_str(&raw).map_err(|e| NoiseError::corpus_read(path, e))?;
        info!(path = %path.display(), pairs = lexicon.len(), "lexicon loaded");
        Ok(lexicon)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// How often each target occurs as a best target.
    pub fn target_vocabulary(&self) -> AHashMap<&str, u64> {
        let mut vocab = AHashMap::new();
        for (_, target) in &self.pairs {
            *vocab.entry(target.as_str()).or_insert(0) += 1;
        }
        vocab
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
