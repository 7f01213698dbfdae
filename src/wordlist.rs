//! Closed-class (functional) word lists.
//!
//! The list is a JSON object mapping a coarse UPOS tag to the words whose most
//! frequent tag it is:
//!
//! ```text
//! {
//!   "ADP": ["in", "on", "of"],
//!   "DET": ["the", "a"]
//! }
//! ```
//!
//! Lists are built from CoNLL-U treebanks with [`FunctionalWords::from_conllu`].

use crate::error::{NoiseError, Result};
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Universal POS tags treated as closed-class.
pub const CLOSED_CLASS_TAGS: &[&str] = &["ADP", "AUX", "CCONJ", "DET", "PART", "PRON", "SCONJ"];

#[derive(Debug, Clone, Default)]
pub struct FunctionalWords {
    by_tag: BTreeMap<String, Vec<String>>,
    words: AHashSet<String>,
}

impl FunctionalWords {
    pub fn from_tag_map(by_tag: BTreeMap<String, Vec<String>>) -> Self {
        let words = by_tag.values().flatten().cloned().collect();
        Self { by_tag, words }
    }

    /// Load a tag -> word list JSON file.
    ///
    /// # Errors
    /// Returns `CorpusRead` if the file is unreadable or malformed.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| NoiseError::corpus_read(path, e))?;
        let by_tag: BTreeMap<String, Vec<String>> =
            serde_json::from_str(&raw).map_err(|e| NoiseError::corpus_read(path, e))?;
        Ok(Self::from_tag_map(by_tag))
    }

    /// Build a list from a CoNLL-U treebank.
    ///
    /// Each lowercased form is assigned its most frequent UPOS tag (ties go to
    /// the lexicographically smaller tag); forms whose tag is closed-class are kept.
    pub fn from_conllu(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| NoiseError::corpus_read(path, e))?;
        let reader = BufReader::new(file);

        let mut word_tags: AHashMap<String, BTreeMap<String, u64>> = AHashMap::new();
        for line in reader.lines() {
            let line = line.map_err(|e| NoiseError::corpus_read(path, e))?;
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let columns: Vec<&str> = line.split('\t').collect();
            if columns.len() < 4 {
                return Err(NoiseError::corpus_read(
                    path,
                    format!("malformed CoNLL-U line: {line}"),
                ));
            }
            // Multiword token ranges and empty nodes carry no UPOS of their own.
            let id = columns[0];
            if id.contains('-') || id.contains('.') {
                continue;
            }

            *word_tags
                .entry(columns[1].to_lowercase())
                .or_default()
                .entry(columns[3].to_string())
                .or_insert(0) += 1;
        }

        let mut by_tag: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (word, tags) in word_tags {
            let best = tags
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(tag, _)| tag.clone());
            if let Some(tag) = best.filter(|t| CLOSED_CLASS_TAGS.contains(&t.as_str())) {
                by_tag.entry(tag).or_default().push(word);
            }
        }
        for words in by_tag.values_mut() {
            words.sort();
        }

        let list = Self::from_tag_map(by_tag);
        info!(words = list.len(), "functional word list built");
        Ok(list)
    }

    pub fn is_functional(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn by_tag(&self) -> &BTreeMap<String, Vec<String>> {
        &self.by_tag
    }
}
