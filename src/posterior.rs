//! Posterior estimation of noise parameters from a bilingual lexicon.
//!
//! Given (source, target) word pairs between a high-resource language and a
//! related variety, the estimator attributes observed divergence to the three
//! noise families in a fixed order: phonological, then morphological, then
//! lexical. Each stage only counts pairs that the earlier stages cannot explain:
//! phonological change is limited to pairs within the language's edit distance
//! threshold, morphological change to pairs sharing a stem, and a lexical change
//! requires a target unrelated to the source.
//!
//! All estimates are heuristics over noisy lexicons; they are meant to be fed
//! back into the forward noisers as plausible parameter settings.

use crate::config::Config;
use crate::edit::{align, normalized_distance, EditKind};
use crate::error::Result;
use crate::lexicon::BilingualLexicon;
use crate::phonological::{interior_windows, pad, Window};
use crate::script::Language;
use crate::stem::same_stem;
use crate::suffix::{candidate_suffixes, last_chars, SuffixInventory};
use crate::vocab::{VocabFilter, Vocabulary};
use crate::wordlist::FunctionalWords;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Estimated noise parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PosteriorEstimate {
    pub theta_func: f64,
    pub theta_content: f64,
    pub theta_morph: f64,
    pub theta_phon: f64,
}

impl fmt::Display for PosteriorEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Theta content: {:.2}", self.theta_content)?;
        writeln!(f, "Theta func:    {:.2}", self.theta_func)?;
        writeln!(f, "Theta morph:   {:.2}", self.theta_morph)?;
        write!(f, "Theta phon:    {:.2}", self.theta_phon)
    }
}

pub struct Posterior {
    lang: &'static str,
    pairs: Vec<(String, String)>,
    source_vocab: Vocabulary,
    functional: FunctionalWords,
    ned_threshold: f64,
    top_k: usize,
}

impl Posterior {
    /// Pairs are lowercased so they compare against the lowercased vocabulary.
    /// Aliases such as `hi` resolve to their canonical code before the NED
    /// threshold and stem rule are looked up.
    ///
    /// # Errors
    /// `UnsupportedLanguage` if `lang` is not in the registry.
    pub fn new(
        lang: &str,
        lexicon: &BilingualLexicon,
        source_vocab: Vocabulary,
        functional: FunctionalWords,
        config: &Config,
    ) -> Result<Self> {
        let lang = Language::resolve(lang)?.code();
        let pairs = lexicon
            .pairs()
            .iter()
            .map(|(s, t)| (s.to_lowercase(), t.to_lowercase()))
            .collect();

        Ok(Self {
            lang,
            pairs,
            source_vocab,
            functional,
            ned_threshold: config.ned_threshold(lang),
            top_k: config.top_k_suffixes,
        })
    }

    /// Load the lexicon, the source corpus and the functional word list.
    ///
    /// # Errors
    /// `CorpusRead` if any of the inputs is unreadable or malformed,
    /// `UnsupportedLanguage` for an unknown `lang`.
    pub fn from_files(
        lang: &str,
        lexicon: &Path,
        source_text: &Path,
        wordlist: &Path,
        config: &Config,
    ) -> Result<Self> {
        let lexicon = BilingualLexicon::from_json_file(lexicon)?;
        let source_vocab = Vocabulary::from_path(source_text, VocabFilter::NoDigits)?;
        let functional = FunctionalWords::from_json_file(wordlist)?;
        Self::new(lang, &lexicon, source_vocab, functional, config)
    }

    /// Share of functional and of content pairs whose target is a new word.
    ///
    /// Returns `(theta_func, theta_content)`.
    pub fn lexical(&self) -> (f64, f64) {
        let (mut changed_func, mut total_func) = (0u64, 0u64);
        let (mut changed_content, mut total_content) = (0u64, 0u64);

        for (src, tgt) in &self.pairs {
            let unrelated = src != tgt
                && !self.source_vocab.contains(tgt)
                && !same_stem(src, tgt, self.lang);

            if self.functional.is_functional(src) {
                total_func += 1;
                if unrelated {
                    changed_func += 1;
                }
            } else {
                total_content += 1;
                if unrelated && normalized_distance(src, tgt) > self.ned_threshold {
                    changed_content += 1;
                }
            }
        }

        let theta_func = ratio(changed_func, total_func, "functional pairs");
        let theta_content = ratio(changed_content, total_content, "content pairs");
        debug!(changed_func, total_func, changed_content, total_content, "lexical counts");
        (theta_func, theta_content)
    }

    /// Mean, over source 3-character contexts, of how often the center changed.
    ///
    /// A substituted interior character counts as a change of its context when
    /// both neighbours are aligned one-to-one with the target. The neighbours
    /// may themselves be substituted, since the forward noiser changes adjacent
    /// characters independently.
    pub fn phonological(&self) -> f64 {
        let mut seen: BTreeMap<Window, u64> = BTreeMap::new();
        let mut changed: BTreeMap<Window, u64> = BTreeMap::new();

        for (src, tgt) in &self.pairs {
            let src_chars: Vec<char> = src.chars().collect();
            let tgt_chars: Vec<char> = tgt.chars().collect();
            let s = pad(&src_chars);
            let t = pad(&tgt_chars);

            let alignment = align(&s, &t);
            if alignment.normalized > self.ned_threshold {
                continue;
            }
            let positions = alignment.aligned_positions(s.len());

            for op in alignment.ops.iter().filter(|op| op.kind == EditKind::Replace) {
                let (i, j) = (op.src_pos, op.tgt_pos);
                if s[i] == t[j] {
                    continue;
                }
                // Only interior characters: never a marker, never the first or last letter.
                if i < 2 || j < 2 || i + 2 >= s.len() || j + 2 >= t.len() {
                    continue;
                }
                if positions[i - 1] == Some(j - 1) && positions[i + 1] == Some(j + 1) {
                    *changed.entry((s[i - 1], s[i], s[i + 1])).or_insert(0) += 1;
                }
            }

            for (_, window) in interior_windows(&src_chars) {
                *seen.entry(window).or_insert(0) += 1;
            }
        }

        if seen.is_empty() {
            warn!("no source contexts observed, theta_phon defaults to 0");
            return 0.0;
        }

        let total: f64 = seen
            .iter()
            .map(|(window, &count)| changed.get(window).copied().unwrap_or(0) as f64 / count as f64)
            .sum();
        total / seen.len() as f64
    }

    /// Mean, over observed top-K source suffixes, of how often the suffix changed
    /// between stem-sharing pairs.
    pub fn morphological(&self) -> f64 {
        let inventory = SuffixInventory::build(&self.source_vocab, self.top_k);
        // suffix -> (occurrences, changes)
        let mut stats: BTreeMap<String, (u64, u64)> = BTreeMap::new();

        for (src, tgt) in &self.pairs {
            if !same_stem(src, tgt, self.lang) {
                continue;
            }
            for suffix in candidate_suffixes(src) {
                if !inventory.contains(&suffix) {
                    continue;
                }
                let differs = last_chars(tgt, suffix.chars().count()) != suffix;
                let entry = stats.entry(suffix).or_insert((0, 0));
                entry.0 += 1;
                if differs {
                    entry.1 += 1;
                }
            }
        }

        if stats.is_empty() {
            warn!("no top-k suffixes observed, theta_morph defaults to 0");
            return 0.0;
        }
        let total: f64 = stats
            .values()
            .map(|&(seen, changed)| changed as f64 / seen as f64)
            .sum();
        total / stats.len() as f64
    }

    /// Run all estimators in precedence order.
    pub fn estimate(&self) -> PosteriorEstimate {
        info!(lang = %self.lang, pairs = self.pairs.len(), "estimating posteriors");
        let theta_phon = self.phonological();
        let theta_morph = self.morphological();
        let (theta_func, theta_content) = self.lexical();

        let estimate = PosteriorEstimate {
            theta_func,
            theta_content,
            theta_morph,
            theta_phon,
        };
        info!(
            theta_func,
            theta_content, theta_morph, theta_phon, "posterior estimate"
        );
        estimate
    }
}

fn ratio(numerator: u64, denominator: u64, what: &str) -> f64 {
    if denominator == 0 {
        warn!(partition = what, "empty partition, estimate defaults to 0");
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NoiseError;

    fn posterior(pairs: &[(&str, &str)], corpus: &str, functional: &[&str]) -> Posterior {
        let lexicon = BilingualLexicon::from_pairs(pairs.iter().copied());
        let vocab = Vocabulary::from_lines([corpus], VocabFilter::NoDigits);
        let by_tag: BTreeMap<String, Vec<String>> = [(
            "DET".to_string(),
            functional.iter().map(|w| w.to_string()).collect(),
        )]
        .into_iter()
        .collect();
        Posterior::new(
            "eng",
            &lexicon,
            vocab,
            FunctionalWords::from_tag_map(by_tag),
            &Config::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_stem_sharing_pairs_are_not_lexical_changes() {
        let post = posterior(&[("running", "running"), ("cats", "cat")], "running cats", &[]);
        let (theta_func, theta_content) = post.lexical();
        assert_eq!(theta_content, 0.0);
        // No functional pairs at all.
        assert_eq!(theta_func, 0.0);
    }

    #[test]
    fn test_lexical_partitions() {
        let post = posterior(
            &[("the", "el"), ("house", "casa"), ("dog", "dog")],
            "the house dog",
            &["the"],
        );
        assert_eq!(post.lexical(), (1.0, 0.5));
    }

    #[test]
    fn test_target_in_source_vocab_is_not_new() {
        let post = posterior(&[("house", "dog")], "house dog", &[]);
        assert_eq!(post.lexical().1, 0.0);
    }

    #[test]
    fn test_phonological_interior_contexts() {
        let post = posterior(&[("cat", "cot"), ("cap", "cap")], "cat cap", &[]);
        assert!((post.phonological() - 0.5).abs() < 1e-9);

        // A change of the first letter is never attributed to phonology.
        let post = posterior(&[("cat", "bat")], "cat", &[]);
        assert_eq!(post.phonological(), 0.0);
    }

    #[test]
    fn test_phonological_counts_adjacent_substitutions() {
        // Two neighbouring interior letters changed: both contexts count.
        let post = posterior(&[("abcdefgh", "abxyefgh")], "abcdefgh", &[]);
        assert!((post.phonological() - 2.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_phonological_skips_distant_pairs() {
        let post = posterior(&[("cat", "dog"), ("sit", "sat")], "cat sit", &[]);
        // "cat"/"dog" is beyond the threshold and contributes no contexts.
        assert!((post.phonological() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_morphological_suffix_changes() {
        let post = posterior(
            &[("walking", "walkin"), ("talking", "talking")],
            "walking talking walked talked",
            &[],
        );
        assert!((post.morphological() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_language_aliases_share_rules() {
        let lexicon = BilingualLexicon::from_pairs([("कमल", "कुमार")]);
        let build = |lang: &str| {
            Posterior::new(
                lang,
                &lexicon,
                Vocabulary::from_lines(["कमल"], VocabFilter::NoDigits),
                FunctionalWords::default(),
                &Config::default(),
            )
        };
        let hin = build("hin").unwrap();
        let hi = build("hi").unwrap();
        // Same first character: a shared stem under the Hindi rule.
        assert_eq!(hin.lexical(), (0.0, 0.0));
        assert_eq!(hi.estimate(), hin.estimate());

        assert!(matches!(
            build("xx"),
            Err(NoiseError::UnsupportedLanguage(code)) if code == "xx"
        ));
    }

    #[test]
    fn test_empty_lexicon_estimates_zero() {
        let post = posterior(&[], "anything", &[]);
        let estimate = post.estimate();
        assert_eq!(
            estimate,
            PosteriorEstimate {
                theta_func: 0.0,
                theta_content: 0.0,
                theta_morph: 0.0,
                theta_phon: 0.0,
            }
        );
    }

    #[test]
    fn test_estimate_serializes() {
        let post = posterior(&[("cat", "cot")], "cat", &[]);
        let json = serde_json::to_value(post.estimate()).unwrap();
        assert!(json.get("theta_phon").is_some());
        assert!(json.get("theta_content").is_some());
    }
}
