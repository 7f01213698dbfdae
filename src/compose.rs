//! Composition of several noisers over the same text.
//!
//! Each configured word-level noiser sees the original sentence. Their outputs
//! are merged token by token with a fixed precedence:
//!
//! 1. a word changed by the lexical noiser takes the lexical output;
//! 2. otherwise the phonological output is the base;
//! 3. if the morphological noiser changed the word, the phonologically noised
//!    stem is joined with the morphologically noised suffix.
//!
//! Character-level noise runs last, over the merged sentence.

use crate::character_level::CharacterLevelNoiser;
use crate::config::Config;
use crate::error::{NoiseError, Result};
use crate::lexical::LexicalNoiser;
use crate::morphological::MorphologicalNoiser;
use crate::noise_spec::{self, NoiseKind, NoiserConfig};
use crate::phonological::PhonologicalNoiser;
use crate::stem::common_prefix_len;
use rayon::prelude::*;
use tracing::{info, warn};

/// A constructed noiser of any kind.
#[derive(Debug)]
pub enum Noiser {
    Phonological(PhonologicalNoiser),
    Lexical(LexicalNoiser),
    Morphological(MorphologicalNoiser),
    CharacterLevel(CharacterLevelNoiser),
}

impl Noiser {
    /// Build a noiser from its validated configuration.
    pub fn build(config: &NoiserConfig, run: &Config) -> Result<Self> {
        let noiser = match config {
            NoiserConfig::Phonological(p) => Noiser::Phonological(PhonologicalNoiser::new(p, run)?),
            NoiserConfig::Lexical(p) => Noiser::Lexical(LexicalNoiser::new(p, run)?),
            NoiserConfig::Morphological(p) => {
                Noiser::Morphological(MorphologicalNoiser::new(p, run)?)
            }
            NoiserConfig::CharacterLevel(p) => {
                Noiser::CharacterLevel(CharacterLevelNoiser::new(p, run)?)
            }
        };
        Ok(noiser)
    }
}

#[derive(Debug, Default)]
pub struct NoiseComposer {
    phonological: Option<PhonologicalNoiser>,
    lexical: Option<LexicalNoiser>,
    morphological: Option<MorphologicalNoiser>,
    character: Option<CharacterLevelNoiser>,
}

impl NoiseComposer {
    /// Parse a specification string and build every noiser it names.
    ///
    /// # Errors
    /// Any configuration, language or corpus error aborts before text is noised.
    pub fn from_spec(spec: &str, config: &Config) -> Result<Self> {
        let configs = noise_spec::parse(spec)?;
        let noisers = configs
            .iter()
            .map(|c| Noiser::build(c, config))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_noisers(noisers))
    }

    pub fn from_noisers(noisers: Vec<Noiser>) -> Self {
        let mut composer = Self::default();
        for noiser in noisers {
            match noiser {
                Noiser::Phonological(n) => composer.phonological = Some(n),
                Noiser::Lexical(n) => composer.lexical = Some(n),
                Noiser::Morphological(n) => composer.morphological = Some(n),
                Noiser::CharacterLevel(n) => composer.character = Some(n),
            }
        }
        info!(kinds = ?composer.kinds(), "noise composer ready");
        composer
    }

    /// Configured noise types, in composition order.
    pub fn kinds(&self) -> Vec<NoiseKind> {
        let mut kinds = Vec::new();
        if self.lexical.is_some() {
            kinds.push(NoiseKind::Lexical);
        }
        if self.phonological.is_some() {
            kinds.push(NoiseKind::Phonological);
        }
        if self.morphological.is_some() {
            kinds.push(NoiseKind::Morphological);
        }
        if self.character.is_some() {
            kinds.push(NoiseKind::CharacterLevel);
        }
        kinds
    }

    fn word_level_count(&self) -> usize {
        [
            self.phonological.is_some(),
            self.lexical.is_some(),
            self.morphological.is_some(),
        ]
        .into_iter()
        .filter(|&present| present)
        .count()
    }

    /// Noise one sentence.
    ///
    /// # Errors
    /// `CompositionMismatch` if a noiser changed the number of tokens.
    pub fn apply(&self, input: &str) -> Result<String> {
        let merged = match self.word_level_count() {
            0 => input.to_string(),
            1 => {
                if let Some(n) = &self.lexical {
                    n.apply_noise(input)
                } else if let Some(n) = &self.phonological {
                    n.apply_noise(input)
                } else if let Some(n) = &self.morphological {
                    n.apply_noise(input)
                } else {
                    input.to_string()
                }
            }
            _ => self.compose(input)?,
        };

        Ok(match &self.character {
            Some(n) => n.apply_noise(&merged),
            None => merged,
        })
    }

    fn compose(&self, input: &str) -> Result<String> {
        let original: Vec<&str> = input.split_whitespace().collect();

        let lexical = tokens_of(
            input,
            self.lexical.as_ref().map(|n| n.apply_noise(input)),
            "lexical",
        )?;
        let phonological = tokens_of(
            input,
            self.phonological.as_ref().map(|n| n.apply_noise(input)),
            "phonological",
        )?;
        let morphological = tokens_of(
            input,
            self.morphological.as_ref().map(|n| n.apply_noise(input)),
            "morphological",
        )?;

        let composed: Vec<String> = original
            .iter()
            .enumerate()
            .map(|(i, word)| merge_token(word, &lexical[i], &phonological[i], &morphological[i]))
            .collect();
        Ok(composed.join(" "))
    }

    /// Noise many sentences in parallel, keeping their order.
    ///
    /// A sentence that fails to compose is logged and passed through unchanged.
    pub fn apply_lines<S: AsRef<str> + Sync>(&self, lines: &[S]) -> Vec<String> {
        lines
            .par_iter()
            .map(|line| {
                let line = line.as_ref();
                match self.apply(line) {
                    Ok(noised) => noised,
                    Err(err) => {
                        warn!(sentence = line, error = %err, "leaving sentence unchanged");
                        line.to_string()
                    }
                }
            })
            .collect()
    }

    /// Dump every noiser's artifacts (only those configured with an output directory write).
    pub fn record_artifacts(&self) -> Result<()> {
        if let Some(n) = &self.phonological {
            n.record_artifacts()?;
        }
        if let Some(n) = &self.lexical {
            n.record_artifacts()?;
        }
        if let Some(n) = &self.morphological {
            n.record_artifacts()?;
        }
        Ok(())
    }
}

/// Merge the three word-level outputs for one token.
///
/// Splicing needs the phonological output to keep the word's length; if it
/// does not, the phonological output is kept for that word alone.
fn merge_token(word: &str, lexical: &str, phonological: &str, morphological: &str) -> String {
    if lexical != word {
        return lexical.to_string();
    }
    if morphological == word {
        return phonological.to_string();
    }

    let base: Vec<char> = phonological.chars().collect();
    if base.len() != word.chars().count() {
        warn!(
            token = word,
            phonological, "phonological noise changed the word length, suffix noise skipped"
        );
        return phonological.to_string();
    }
    let stem = common_prefix_len(word, morphological);
    let suffix: String = morphological.chars().skip(stem).collect();
    let spliced: String = base[..stem].iter().collect();
    spliced + &suffix
}

/// Tokens of one noiser's output, or of the input for an absent noiser.
fn tokens_of(input: &str, output: Option<String>, name: &str) -> Result<Vec<String>> {
    let expected = input.split_whitespace().count();
    let tokens: Vec<String> = output
        .as_deref()
        .unwrap_or(input)
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if tokens.len() != expected {
        return Err(NoiseError::CompositionMismatch(format!(
            "{name} noise produced {} tokens for {expected} input tokens",
            tokens.len()
        )));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::LexicalParams;
    use crate::morphological::MorphologicalParams;
    use crate::phonological::PhonologicalParams;
    use crate::vocab::{VocabFilter, Vocabulary};
    use std::io::Write;
    use std::path::PathBuf;

    const CORPUS: &str = "the walking man talking to the singing cat while jumping";

    fn vocab() -> Vocabulary {
        Vocabulary::from_lines([CORPUS], VocabFilter::Alphabetic)
    }

    fn phonological(theta: f64) -> PhonologicalNoiser {
        let params = PhonologicalParams {
            lang: "eng".to_string(),
            text_file: PathBuf::from("unused.txt"),
            theta_phon: theta,
            output_dir: None,
            seed: Some(11),
            ipa_classes: None,
        };
        PhonologicalNoiser::from_vocabulary(&params, &Config::default(), &vocab()).unwrap()
    }

    fn lexical(theta: f64) -> LexicalNoiser {
        let params = LexicalParams::new("unused.txt", theta);
        LexicalNoiser::from_vocabulary(&params, &Config::default(), &vocab(), None).unwrap()
    }

    fn morphological(theta: f64) -> MorphologicalNoiser {
        let mut params = MorphologicalParams::new("unused.txt", theta);
        params.chargram_length = Some(2);
        MorphologicalNoiser::from_vocabulary(&params, &Config::default(), &vocab()).unwrap()
    }

    #[test]
    fn test_no_noisers_is_identity() {
        let composer = NoiseComposer::from_spec("", &Config::default()).unwrap();
        assert!(composer.kinds().is_empty());
        assert_eq!(composer.apply("the cat").unwrap(), "the cat");
    }

    #[test]
    fn test_single_noiser_applied_directly() {
        let phon = phonological(1.0);
        let expected = phon.apply_noise(CORPUS);
        let composer = NoiseComposer::from_noisers(vec![Noiser::Phonological(phon)]);
        assert_eq!(composer.apply(CORPUS).unwrap(), expected);
    }

    #[test]
    fn test_lexical_change_wins() {
        let lex = lexical(1.0);
        let lexical_out = lex.apply_noise(CORPUS);
        let composer = NoiseComposer::from_noisers(vec![
            Noiser::Phonological(phonological(1.0)),
            Noiser::Lexical(lex),
        ]);
        assert_eq!(composer.apply(CORPUS).unwrap(), lexical_out);
    }

    #[test]
    fn test_absent_and_identity_noisers() {
        let phon = phonological(0.6);
        let expected = phon.apply_noise(CORPUS);
        let composer = NoiseComposer::from_noisers(vec![
            Noiser::Phonological(phon),
            Noiser::Morphological(morphological(0.0)),
        ]);
        assert_eq!(composer.apply(CORPUS).unwrap(), expected);
    }

    #[test]
    fn test_phonological_stem_with_morphological_suffix() {
        let phon = phonological(1.0);
        let morph = morphological(1.0);
        let word = "walking";
        let phon_word: Vec<char> = phon.apply_noise(word).chars().collect();
        let morph_word = morph.apply_noise(word);
        assert_ne!(morph_word, word);

        let stem = common_prefix_len(word, &morph_word);
        let expected: String = phon_word[..stem]
            .iter()
            .copied()
            .chain(morph_word.chars().skip(stem))
            .collect();

        let composer = NoiseComposer::from_noisers(vec![
            Noiser::Morphological(morph),
            Noiser::Phonological(phon),
        ]);
        assert_eq!(composer.apply(word).unwrap(), expected);
    }

    #[test]
    fn test_merge_token_precedence() {
        assert_eq!(merge_token("walking", "blorp", "wolking", "walkez"), "blorp");
        assert_eq!(merge_token("walking", "walking", "wolking", "walking"), "wolking");
        assert_eq!(merge_token("walking", "walking", "wolking", "walkez"), "wolkez");
    }

    #[test]
    fn test_merge_token_length_change_keeps_phonological() {
        // Only this word falls back; the rest of the sentence still merges.
        assert_eq!(merge_token("walking", "walking", "wolkinng", "walkez"), "wolkinng");
        assert_eq!(merge_token("talking", "talking", "tolking", "talkez"), "tolkez");
    }

    #[test]
    fn test_token_count_mismatch_detected() {
        let err = tokens_of("a b c", Some("a b".to_string()), "lexical").unwrap_err();
        assert!(matches!(err, NoiseError::CompositionMismatch(_)));
        assert_eq!(tokens_of("a b", None, "lexical").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_apply_lines_keeps_order() {
        let composer = NoiseComposer::from_noisers(vec![
            Noiser::Phonological(phonological(0.5)),
            Noiser::Lexical(lexical(0.3)),
        ]);
        let lines = vec!["the walking man", "talking to the cat", "", "jumping"];
        let noised = composer.apply_lines(&lines);
        assert_eq!(noised.len(), lines.len());
        for (line, out) in lines.iter().zip(&noised) {
            assert_eq!(&composer.apply(line).unwrap(), out);
        }
    }

    #[test]
    fn test_from_spec_builds_from_files() {
        let mut corpus = tempfile::NamedTempFile::new().unwrap();
        writeln!(corpus, "{CORPUS}").unwrap();
        let path = corpus.path().display().to_string();
        let spec = format!(
            "phonological-lang=eng,theta_phon=0.2,text_file=<{path}>;\
             morph-text_file=<{path}>,theta_morph=0.5;\
             character_level-lang=eng,swap_theta=0.0"
        );

        let composer = NoiseComposer::from_spec(&spec, &Config::default()).unwrap();
        assert_eq!(
            composer.kinds(),
            vec![
                NoiseKind::Phonological,
                NoiseKind::Morphological,
                NoiseKind::CharacterLevel
            ]
        );
        let out = composer.apply(CORPUS).unwrap();
        assert_eq!(out.split(' ').count(), CORPUS.split(' ').count());
    }

    #[test]
    fn test_from_spec_fails_fast() {
        let spec = "phonological-lang=xx,theta_phon=0.1,text_file=<missing.txt>";
        assert!(matches!(
            NoiseComposer::from_spec(spec, &Config::default()),
            Err(NoiseError::UnsupportedLanguage(_)) | Err(NoiseError::CorpusRead { .. })
        ));
    }
}
