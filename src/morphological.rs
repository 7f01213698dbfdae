//! Global morphological noise.
//!
//! The noiser ranks the suffixes of a corpus vocabulary, keeps the top-K and,
//! with probability `theta_morph`, maps each of them to a pseudo-suffix sampled
//! from a character n-gram model trained on the suffixes themselves. A word is
//! noised by locating its longest mapped suffix (at most half its length) and
//! splicing in the replacement, so every word ending in `-ing` receives the
//! same new ending.

use crate::artifacts;
use crate::chargram::CharGramModel;
use crate::config::Config;
use crate::error::Result;
use crate::suffix::SuffixInventory;
use crate::token::Token;
use crate::vocab::{VocabFilter, Vocabulary, NOISER_PUNCTUATION};
use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Validated parameters for [`MorphologicalNoiser`].
#[derive(Debug, Clone)]
pub struct MorphologicalParams {
    pub text_file: PathBuf,
    pub theta_morph: f64,
    pub top_k: Option<usize>,
    pub chargram_length: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl MorphologicalParams {
    pub fn new(text_file: impl Into<PathBuf>, theta_morph: f64) -> Self {
        Self {
            text_file: text_file.into(),
            theta_morph,
            top_k: None,
            chargram_length: None,
            output_dir: None,
            seed: None,
        }
    }
}

pub struct MorphologicalNoiser {
    suffix_map: AHashMap<String, String>,
    longest: usize,
    output_dir: Option<PathBuf>,
}

impl MorphologicalNoiser {
    pub fn new(params: &MorphologicalParams, config: &Config) -> Result<Self> {
        let vocab = Vocabulary::from_path(&params.text_file, VocabFilter::Alphabetic)?;
        Self::from_vocabulary(params, config, &vocab)
    }

    pub fn from_vocabulary(
        params: &MorphologicalParams,
        config: &Config,
        vocab: &Vocabulary,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&params.theta_morph) {
            warn!(theta_morph = params.theta_morph, "theta_morph outside [0, 1]");
        }

        let top_k = params.top_k.unwrap_or(config.top_k_suffixes);
        let inventory = SuffixInventory::build(vocab, top_k);
        let order = params.chargram_length.unwrap_or(config.chargram_length);
        let model = CharGramModel::train(inventory.ranked().iter().map(|(s, _)| s.as_str()), order)?;

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed.unwrap_or(config.seed));
        let mut suffix_map = AHashMap::with_capacity(inventory.len());
        let mut replaced = 0usize;
        for (suffix, _) in inventory.ranked() {
            let mapped = if rng.gen::<f64>() < params.theta_morph {
                replaced += 1;
                model.generate(
                    suffix,
                    suffix.chars().count() as f64,
                    &mut rng,
                    |candidate| inventory.contains(candidate),
                    config.max_generation_attempts,
                )?
            } else {
                suffix.clone()
            };
            suffix_map.insert(suffix.clone(), mapped);
        }

        let longest = suffix_map.keys().map(|s| s.chars().count()).max().unwrap_or(0);
        info!(suffixes = suffix_map.len(), replaced, "morphological noiser ready");
        Ok(Self {
            suffix_map,
            longest,
            output_dir: params.output_dir.clone(),
        })
    }

    /// The suffix substitution map, in suffix order.
    pub fn sorted_suffix_map(&self) -> BTreeMap<&str, &str> {
        self.suffix_map
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    pub fn mapped(&self, suffix: &str) -> Option<&str> {
        self.suffix_map.get(suffix).map(String::as_str)
    }

    pub fn apply_noise(&self, input: &str) -> String {
        input
            .split_whitespace()
            .map(|token| self.noise_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn noise_token(&self, token: &str) -> String {
        let parts = Token::split(token, NOISER_PUNCTUATION);
        if parts.core.is_empty() || !parts.core.chars().all(char::is_alphabetic) {
            return token.to_string();
        }

        let original: Vec<char> = parts.core.chars().collect();
        let lowered: Vec<char> = parts.core.to_lowercase().chars().collect();
        if lowered.len() != original.len() {
            return token.to_string();
        }

        let max_len = (original.len() / 2).min(self.longest);
        for i in (2..=max_len).rev() {
            let suffix: String = lowered[lowered.len() - i..].iter().collect();
            let Some(mapped) = self.suffix_map.get(&suffix) else {
                continue;
            };
            if *mapped == suffix {
                return token.to_string();
            }

            let stem: String = original[..original.len() - i].iter().collect();
            let tail_upper = original[original.len() - i..].iter().all(|c| c.is_uppercase());
            let new_suffix = if tail_upper {
                mapped.to_uppercase()
            } else {
                mapped.clone()
            };
            return parts.rebuild(&format!("{stem}{new_suffix}"));
        }
        token.to_string()
    }

    pub fn record_artifacts(&self) -> Result<()> {
        let Some(dir) = &self.output_dir else {
            return Ok(());
        };
        artifacts::write_json(dir, "morph_suffix_map.json", &self.sorted_suffix_map())?;
        Ok(())
    }
}

impl std::fmt::Debug for MorphologicalNoiser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MorphologicalNoiser")
            .field("suffixes", &self.suffix_map.len())
            .finish()
    }
}
