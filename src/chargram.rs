//! Character n-gram model for pseudoword generation.
//!
//! The model keeps one count table per order `n` in `1..=order`, each mapping
//! an `(n-1)`-character prefix to a distribution over the next character.
//! Words are prefixed with a start marker before counting, so the first
//! characters of generated words follow the distribution of real word onsets.
//!
//! # Backoff
//!
//! Generation uses the highest order whose prefix fits the text produced so
//! far. When that prefix was never observed, the leftmost prefix character is
//! dropped and the next lower order is tried, down to the unigram table.
//!
//! # Example
//!
//! ```rust
//! use lingnoise::chargram::CharGramModel;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let model = CharGramModel::train(["the", "cat", "sat"], 3).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(7);
//! let word = model
//!     .generate("cat", 3.0, &mut rng, |w| ["the", "cat", "sat"].contains(&w), 1000)
//!     .unwrap();
//! assert!(!["the", "cat", "sat"].contains(&word.as_str()));
//! ```

use crate::error::{NoiseError, Result};
use ahash::AHashMap;
use rand::Rng;
use std::collections::BTreeMap;

/// Marker prepended to every training word.
pub const START_MARKER: char = '!';

/// Character n-gram counts for every order up to a maximum.
pub struct CharGramModel {
    order: usize,
    /// `tables[n - 1]`: prefix of `n - 1` chars -> next char -> count.
    tables: Vec<AHashMap<String, BTreeMap<char, u64>>>,
}

impl CharGramModel {
    /// Train the model on a set of words.
    ///
    /// # Errors
    /// Returns `Configuration` if `order` is zero.
    pub fn train<'a, I>(words: I, order: usize) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if order == 0 {
            return Err(NoiseError::Configuration(
                "chargram_length must be at least 1".to_string(),
            ));
        }

        let mut tables: Vec<AHashMap<String, BTreeMap<char, u64>>> =
            (0..order).map(|_| AHashMap::new()).collect();

        for word in words {
            let chars: Vec<char> = std::iter::once(START_MARKER).chain(word.chars()).collect();
            for n in 1..=order {
                if chars.len() < n {
                    break;
                }
                for ngram in chars.windows(n) {
                    let next = ngram[n - 1];
                    if next == START_MARKER {
                        continue;
                    }
                    let prefix: String = ngram[..n - 1].iter().collect();
                    *tables[n - 1]
                        .entry(prefix)
                        .or_default()
                        .entry(next)
                        .or_insert(0) += 1;
                }
            }
        }

        Ok(Self { order, tables })
    }

    fn continuations(&self, prefix: &[char]) -> Option<&BTreeMap<char, u64>> {
        let key: String = prefix.iter().collect();
        self.tables
            .get(prefix.len())
            .and_then(|table| table.get(&key))
            .filter(|dist| !dist.is_empty())
    }

    /// Sample the character following `context` (which starts with the start marker).
    ///
    /// Returns `None` only when the model has no data at all.
    pub fn sample_next<R: Rng + ?Sized>(&self, context: &[char], rng: &mut R) -> Option<char> {
        let width = context.len().min(self.order - 1);
        let mut prefix = &context[context.len() - width..];

        let dist = loop {
            if let Some(dist) = self.continuations(prefix) {
                break dist;
            }
            if prefix.is_empty() {
                return None;
            }
            prefix = &prefix[1..];
        };

        let total: u64 = dist.values().sum();
        let mut pick = rng.gen_range(0..total);
        for (&ch, &count) in dist {
            if pick < count {
                return Some(ch);
            }
            pick -= count;
        }
        None
    }

    /// Generate a pseudoword of length roughly `mean_length`.
    ///
    /// Each attempt draws a body length `max(1, Poisson(mean_length))` and grows
    /// the word one sampled character at a time. Candidates for which
    /// `is_taken(lowercased)` holds are rejected.
    ///
    /// # Errors
    /// Returns `GenerationExhausted` if no candidate is accepted within
    /// `max_attempts`, or if the model is empty.
    pub fn generate<R, F>(
        &self,
        source: &str,
        mean_length: f64,
        rng: &mut R,
        is_taken: F,
        max_attempts: u32,
    ) -> Result<String>
    where
        R: Rng + ?Sized,
        F: Fn(&str) -> bool,
    {
        for _ in 0..max_attempts {
            let length = sample_poisson(mean_length, rng).max(1);
            let mut word = vec![START_MARKER];
            while word.len() < length + 1 {
                match self.sample_next(&word, rng) {
                    Some(ch) => word.push(ch),
                    None => {
                        return Err(NoiseError::GenerationExhausted {
                            word: source.to_string(),
                            attempts: 0,
                        })
                    }
                }
            }

            let candidate: String = word[1..].iter().collect();
            if !is_taken(&candidate.to_lowercase()) {
                return Ok(candidate);
            }
        }

        Err(NoiseError::GenerationExhausted {
            word: source.to_string(),
            attempts: max_attempts,
        })
    }
}

/// Draw from a Poisson distribution with mean `lambda`.
///
/// Knuth's multiplication method below 30, a rounded normal approximation above.
pub fn sample_poisson<R: Rng + ?Sized>(lambda: f64, rng: &mut R) -> usize {
    if lambda <= 0.0 {
        return 0;
    }

    if lambda < 30.0 {
        let limit = (-lambda).exp();
        let mut k = 0;
        let mut p = 1.0;
        loop {
            p *= rng.gen::<f64>();
            if p <= limit {
                return k;
            }
            k += 1;
        }
    }

    let u1: f64 = rng.gen::<f64>().max(f64::EPSILON);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    (lambda + z * lambda.sqrt()).round().max(0.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_training_counts() {
        let model = CharGramModel::train(["ab", "ac"], 2).unwrap();
        let first = model.continuations(&['!']).unwrap();
        assert_eq!(first.get(&'a'), Some(&2));

        let after_a = model.continuations(&['a']).unwrap();
        assert_eq!(after_a.get(&'b'), Some(&1));
        assert_eq!(after_a.get(&'c'), Some(&1));

        let unigrams = model.continuations(&[]).unwrap();
        assert!(!unigrams.contains_key(&START_MARKER));
        assert_eq!(unigrams.get(&'a'), Some(&2));
    }

    #[test]
    fn test_zero_order_rejected() {
        assert!(CharGramModel::train(["ab"], 0).is_err());
    }

    #[test]
    fn test_backoff_to_unigram() {
        let model = CharGramModel::train(["ab"], 3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // "!ab" has no continuation at order 3 or 2, only unigrams remain.
        let next = model.sample_next(&['!', 'a', 'b'], &mut rng).unwrap();
        assert!(next == 'a' || next == 'b');
    }

    #[test]
    fn test_generate_avoids_vocabulary() {
        let vocab = ["the", "cat", "sat"];
        let model = CharGramModel::train(vocab, 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for word in vocab {
            let generated = model
                .generate(word, word.len() as f64, &mut rng, |w| vocab.contains(&w), 1000)
                .unwrap();
            assert!(!vocab.contains(&generated.as_str()));
            assert!(!generated.is_empty());
            assert!(generated.chars().all(|c| "thecas".contains(c)));
        }
    }

    #[test]
    fn test_generate_exhausted() {
        let model = CharGramModel::train(["a"], 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let err = model
            .generate("a", 1.0, &mut rng, |_| true, 25)
            .unwrap_err();
        assert!(matches!(err, NoiseError::GenerationExhausted { attempts: 25, .. }));
    }

    #[test]
    fn test_poisson_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let draws = 20_000;
        let total: usize = (0..draws).map(|_| sample_poisson(4.0, &mut rng)).sum();
        let mean = total as f64 / draws as f64;
        assert!((mean - 4.0).abs() < 0.1, "mean was {mean}");
        assert_eq!(sample_poisson(0.0, &mut rng), 0);
    }
}
