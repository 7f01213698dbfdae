//! Global lexical noise.
//!
//! Every vocabulary word is, with probability `theta_global`, replaced by a
//! pseudoword sampled from a character n-gram model trained on the same
//! vocabulary. The replacement is decided once per word type, so every
//! occurrence of a word in a corpus receives the same pseudoword.
//!
//! When a functional word list is supplied, closed-class words use
//! `theta_func` and open-class words `theta_content` (both default to
//! `theta_global`).

use crate::artifacts;
use crate::chargram::CharGramModel;
use crate::config::Config;
use crate::error::Result;
use crate::token::{capitalize, Token};
use crate::vocab::{VocabFilter, Vocabulary, NOISER_PUNCTUATION};
use crate::wordlist::FunctionalWords;
use ahash::AHashMap;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

/// Validated parameters for [`LexicalNoiser`].
#[derive(Debug, Clone)]
pub struct LexicalParams {
    pub text_file: PathBuf,
    pub theta_global: f64,
    pub chargram_length: Option<usize>,
    pub wordlist: Option<PathBuf>,
    pub theta_func: Option<f64>,
    pub theta_content: Option<f64>,
    pub output_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl LexicalParams {
    pub fn new(text_file: impl Into<PathBuf>, theta_global: f64) -> Self {
        Self {
            text_file: text_file.into(),
            theta_global,
            chargram_length: None,
            wordlist: None,
            theta_func: None,
            theta_content: None,
            output_dir: None,
            seed: None,
        }
    }
}

pub struct LexicalNoiser {
    vocab_map: AHashMap<String, String>,
    output_dir: Option<PathBuf>,
}

impl LexicalNoiser {
    /// Build the noiser from a corpus file.
    ///
    /// # Errors
    /// `CorpusRead` for unreadable inputs, `Configuration` for a zero chargram
    /// length, `GenerationExhausted` if a pseudoword cannot be found.
    pub fn new(params: &LexicalParams, config: &Config) -> Result<Self> {
        let vocab = Vocabulary::from_path(&params.text_file, VocabFilter::Alphabetic)?;
        let functional = match &params.wordlist {
            Some(path) => Some(FunctionalWords::from_json_file(path)?),
            None => None,
        };
        Self::from_vocabulary(params, config, &vocab, functional.as_ref())
    }

    pub fn from_vocabulary(
        params: &LexicalParams,
        config: &Config,
        vocab: &Vocabulary,
        functional: Option<&FunctionalWords>,
    ) -> Result<Self> {
        let theta_func = params.theta_func.unwrap_or(params.theta_global);
        let theta_content = params.theta_content.unwrap_or(params.theta_global);
        for (name, theta) in [
            ("theta_global", params.theta_global),
            ("theta_func", theta_func),
            ("theta_content", theta_content),
        ] {
            if !(0.0..=1.0).contains(&theta) {
                warn!(param = name, theta, "theta outside [0, 1]");
            }
        }

        let order = params.chargram_length.unwrap_or(config.chargram_length);
        let words = vocab.sorted_words();
        let model = CharGramModel::train(words.iter().copied(), order)?;
        info!(order, words = words.len(), "chargram model trained");

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed.unwrap_or(config.seed));
        let mut vocab_map = AHashMap::with_capacity(words.len());
        let mut replaced = 0usize;
        for word in words {
            let theta = match functional {
                Some(list) if list.is_functional(word) => theta_func,
                _ => theta_content,
            };
            let mapped = if rng.gen::<f64>() < theta {
                replaced += 1;
                model.generate(
                    word,
                    word.chars().count() as f64,
                    &mut rng,
                    |candidate| vocab.contains(candidate),
                    config.max_generation_attempts,
                )?
            } else {
                word.to_string()
            };
            vocab_map.insert(word.to_string(), mapped);
        }

        info!(words = vocab_map.len(), replaced, "lexical noiser ready");
        Ok(Self {
            vocab_map,
            output_dir: params.output_dir.clone(),
        })
    }

    /// The word-type substitution map, in word order.
    pub fn sorted_vocab_map(&self) -> BTreeMap<&str, &str> {
        self.vocab_map
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    pub fn mapped(&self, word: &str) -> Option<&str> {
        self.vocab_map.get(word).map(String::as_str)
    }

    /// Replace every in-vocabulary token, keeping its capitalization and punctuation.
    pub fn apply_noise(&self, input: &str) -> String {
        input
            .split_whitespace()
            .map(|token| self.noise_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn noise_token(&self, token: &str) -> String {
        let parts = Token::split(token, NOISER_PUNCTUATION);
        let key = parts.core.to_lowercase();
        match self.vocab_map.get(&key) {
            Some(mapped) if *mapped != key => {
                if parts.starts_uppercase() {
                    parts.rebuild(&capitalize(mapped))
                } else {
                    parts.rebuild(mapped)
                }
            }
            _ => token.to_string(),
        }
    }

    pub fn record_artifacts(&self) -> Result<()> {
        let Some(dir) = &self.output_dir else {
            return Ok(());
        };
        artifacts::write_json(dir, "lexical_vocab_map.json", &self.sorted_vocab_map())?;
        Ok(())
    }
}

impl std::fmt::Debug for LexicalNoiser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LexicalNoiser")
            .field("words", &self.vocab_map.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(lines: &[&str], theta: f64, order: usize) -> LexicalNoiser {
        let vocab = Vocabulary::from_lines(lines.iter().copied(), VocabFilter::Alphabetic);
        let mut params = LexicalParams::new("unused.txt", theta);
        params.chargram_length = Some(order);
        LexicalNoiser::from_vocabulary(&params, &Config::default(), &vocab, None).unwrap()
    }

    #[test]
    fn test_theta_zero_identity() {
        let noiser = build(&["The cat sat on the mat."], 0.0, 3);
        let text = "The cat sat on the mat.";
        assert_eq!(noiser.apply_noise(text), text);
    }

    #[test]
    fn test_the_cat_sat_fully_replaced() {
        let noiser = build(&["the cat sat"], 1.0, 1);
        for word in ["the", "cat", "sat"] {
            let mapped = noiser.mapped(word).unwrap();
            assert!(!["the", "cat", "sat"].contains(&mapped));
        }
        let first = noiser.apply_noise("the cat sat");
        let second = noiser.apply_noise("the cat sat");
        assert_eq!(first, second);
        assert_eq!(first.split(' ').count(), 3);
    }

    #[test]
    fn test_capitalization_and_punctuation() {
        let noiser = build(&["the cat sat"], 1.0, 2);
        let mapped = noiser.mapped("cat").unwrap().to_string();
        assert_eq!(noiser.apply_noise("Cat!"), format!("{}!", capitalize(&mapped)));
        assert_eq!(noiser.apply_noise("(cat"), "(cat");
        assert_eq!(noiser.apply_noise("dog"), "dog");
    }

    #[test]
    fn test_functional_split() {
        let vocab = Vocabulary::from_lines(["the cat sat on a mat"], VocabFilter::Alphabetic);
        let by_tag: BTreeMap<String, Vec<String>> = [
            ("DET".to_string(), vec!["the".to_string(), "a".to_string()]),
            ("ADP".to_string(), vec!["on".to_string()]),
        ]
        .into_iter()
        .collect();
        let functional = FunctionalWords::from_tag_map(by_tag);

        let mut params = LexicalParams::new("unused.txt", 0.5);
        params.theta_func = Some(0.0);
        params.theta_content = Some(1.0);
        let noiser =
            LexicalNoiser::from_vocabulary(&params, &Config::default(), &vocab, Some(&functional))
                .unwrap();

        for word in ["the", "a", "on"] {
            assert_eq!(noiser.mapped(word), Some(word));
        }
        for word in ["cat", "sat", "mat"] {
            assert_ne!(noiser.mapped(word), Some(word));
        }
    }

    #[test]
    fn test_same_seed_same_map() {
        let a = build(&["the quick brown fox jumps over the lazy dog"], 0.5, 3);
        let b = build(&["the quick brown fox jumps over the lazy dog"], 0.5, 3);
        assert_eq!(a.sorted_vocab_map(), b.sorted_vocab_map());
    }
}
