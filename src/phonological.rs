//! Global phonological noise.
//!
//! At construction the noiser collects every 3-character context window seen
//! in the in-script words of a corpus and, with probability `theta_phon`,
//! commits a replacement for the window's center character. Replacements come
//! from the character's phonetic equivalence targets (see [`crate::ipa`]) or,
//! when none exist, from the whole script minus the character itself.
//!
//! Application is a pure lookup: every interior character of an in-script word
//! whose window is in the committed map is replaced. Windows are read from the
//! original word, so the same word is always noised the same way, and the first
//! and last characters of a word are never replaced.
//!
//! ```text
//! corpus:  "the cat sat"     committed: (c,a,t) -> e
//! input:   "Cat cat, sat"    output:    "Cet cet, sat"
//! ```

use crate::artifacts;
use crate::config::Config;
use crate::error::Result;
use crate::ipa::{IpaTable, PhoneticInventory};
use crate::script::Language;
use crate::token::{lower_char, upper_char, Token};
use crate::vocab::{VocabFilter, Vocabulary, NOISER_PUNCTUATION};
use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tracing::{info, warn};

/// Word-start marker used when padding words for context extraction.
pub const WORD_START: char = '<';
/// Word-end marker used when padding words for context extraction.
pub const WORD_END: char = '>';

/// A (prefix, center, suffix) character window.
pub type Window = (char, char, char);

/// Surround a word with boundary markers.
pub fn pad(word: &[char]) -> Vec<char> {
    let mut padded = Vec::with_capacity(word.len() + 2);
    padded.push(WORD_START);
    padded.extend_from_slice(word);
    padded.push(WORD_END);
    padded
}

/// Context windows whose center is an interior character of `word`, paired
/// with the center's position in `word`. Windows centered on the first or
/// last character are never produced.
pub fn interior_windows(word: &[char]) -> Vec<(usize, Window)> {
    let padded = pad(word);
    (2..padded.len().saturating_sub(2))
        .map(|p| (p - 1, (padded[p - 1], padded[p], padded[p + 1])))
        .collect()
}

/// Validated parameters for [`PhonologicalNoiser`].
#[derive(Debug, Clone)]
pub struct PhonologicalParams {
    pub lang: String,
    pub text_file: PathBuf,
    pub theta_phon: f64,
    pub output_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub ipa_classes: Option<PathBuf>,
}

pub struct PhonologicalNoiser {
    language: Language,
    theta_phon: f64,
    targets: BTreeMap<char, Vec<char>>,
    context_map: AHashMap<Window, char>,
    output_dir: Option<PathBuf>,
}

impl PhonologicalNoiser {
    /// Build the noiser from a corpus file.
    ///
    /// # Errors
    /// `UnsupportedLanguage` for an unregistered language, `CorpusRead` for an
    /// unreadable corpus or IPA class file.
    pub fn new(params: &PhonologicalParams, config: &Config) -> Result<Self> {
        let vocab = Vocabulary::from_path(&params.text_file, VocabFilter::Alphabetic)?;
        Self::from_vocabulary(params, config, &vocab)
    }

    /// Build the noiser from an already loaded vocabulary.
    pub fn from_vocabulary(
        params: &PhonologicalParams,
        config: &Config,
        vocab: &Vocabulary,
    ) -> Result<Self> {
        let language = Language::resolve(&params.lang)?;
        if !(0.0..=1.0).contains(&params.theta_phon) {
            warn!(theta_phon = params.theta_phon, "theta_phon outside [0, 1]");
        }

        let table = match &params.ipa_classes {
            Some(path) => IpaTable::from_json_file(path)?,
            None => IpaTable::builtin(),
        };
        let targets = PhoneticInventory::for_language(&language).equivalence_targets(&table);

        let mut contexts: BTreeSet<Window> = BTreeSet::new();
        for word in vocab.sorted_words() {
            if !language.is_valid_word(word) {
                continue;
            }
            let chars: Vec<char> = word.chars().collect();
            contexts.extend(interior_windows(&chars).into_iter().map(|(_, w)| w));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed.unwrap_or(config.seed));
        let mut context_map = AHashMap::new();
        for window in &contexts {
            if rng.gen::<f64>() >= params.theta_phon {
                continue;
            }
            let center = window.1;
            let replacement = match targets.get(&center).filter(|t| !t.is_empty()) {
                Some(candidates) => candidates.choose(&mut rng).copied(),
                None => language.replacement_pool(center).choose(&mut rng).copied(),
            };
            if let Some(replacement) = replacement {
                context_map.insert(*window, replacement);
            }
        }

        info!(
            lang = language.code(),
            contexts = contexts.len(),
            committed = context_map.len(),
            "phonological noiser ready"
        );

        Ok(Self {
            language,
            theta_phon: params.theta_phon,
            targets,
            context_map,
            output_dir: params.output_dir.clone(),
        })
    }

    /// Committed replacements keyed by window, in window order.
    pub fn sorted_context_map(&self) -> BTreeMap<Window, char> {
        self.context_map.iter().map(|(w, c)| (*w, *c)).collect()
    }

    /// Noise every whitespace token of `input`.
    pub fn apply_noise(&self, input: &str) -> String {
        input
            .split_whitespace()
            .map(|token| self.noise_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn noise_token(&self, token: &str) -> String {
        let parts = Token::split(token, NOISER_PUNCTUATION);
        if !self.language.is_valid_word(parts.core) {
            return token.to_string();
        }

        let original: Vec<char> = parts.core.chars().collect();
        let lowered: Vec<char> = original.iter().copied().map(lower_char).collect();
        let mut noised = original.clone();
        for (pos, window) in interior_windows(&lowered) {
            if let Some(&replacement) = self.context_map.get(&window) {
                noised[pos] = if original[pos].is_uppercase() {
                    upper_char(replacement)
                } else {
                    replacement
                };
            }
        }

        parts.rebuild(&noised.into_iter().collect::<String>())
    }

    /// Dump the context map and equivalence targets if an output directory was given.
    pub fn record_artifacts(&self) -> Result<()> {
        let Some(dir) = &self.output_dir else {
            return Ok(());
        };

        let context_map: BTreeMap<String, String> = self
            .sorted_context_map()
            .into_iter()
            .map(|((p, c, s), r)| ([p, c, s].iter().collect(), r.to_string()))
            .collect();
        artifacts::write_json(dir, "phon_context_map.json", &context_map)?;

        let targets: BTreeMap<String, Vec<String>> = self
            .targets
            .iter()
            .map(|(c, t)| (c.to_string(), t.iter().map(|x| x.to_string()).collect()))
            .collect();
        artifacts::write_json(dir, "phon_equivalence_targets.json", &targets)?;
        Ok(())
    }
}

impl std::fmt::Debug for PhonologicalNoiser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhonologicalNoiser")
            .field("lang", &self.language.code())
            .field("theta_phon", &self.theta_phon)
            .field("contexts", &self.context_map.len())
            .finish()
    }
}
