//! Noise specification strings.
//!
//! A specification lists one or more noise types with their parameters:
//!
//! ```text
//! phonological-lang=hin,theta_phon=0.1,text_file=<corpus.txt>;lexical-text_file=<corpus.txt>,theta_global=0.2
//! ```
//!
//! Values wrapped in `<...>` are taken verbatim, so file paths may contain
//! `=`, `,`, `;` or `-`. Every entry is validated against the parameter table
//! of its noise type before any noiser is built.

use crate::character_level::CharacterLevelParams;
use crate::error::{NoiseError, Result};
use crate::lexical::LexicalParams;
use crate::morphological::MorphologicalParams;
use crate::phonological::PhonologicalParams;
use regex::Regex;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const PROTECTED_VALUE: &str = r"<(.*?)>";
const PLACEHOLDER: &str = "\u{1}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoiseKind {
    Phonological,
    Lexical,
    Morphological,
    CharacterLevel,
}

impl NoiseKind {
    pub fn name(self) -> &'static str {
        match self {
            NoiseKind::Phonological => "phonological",
            NoiseKind::Lexical => "lexical",
            NoiseKind::Morphological => "morph",
            NoiseKind::CharacterLevel => "character_level",
        }
    }

    fn required(self) -> &'static [&'static str] {
        match self {
            NoiseKind::Phonological => &["lang", "text_file", "theta_phon"],
            NoiseKind::Lexical => &["text_file", "theta_global"],
            NoiseKind::Morphological => &["text_file", "theta_morph"],
            NoiseKind::CharacterLevel => &["lang", "swap_theta"],
        }
    }

    fn optional(self) -> &'static [&'static str] {
        match self {
            NoiseKind::Phonological => &["output_dir", "seed", "ipa_classes"],
            NoiseKind::Lexical => &[
                "chargram_length",
                "wordlist",
                "theta_func",
                "theta_content",
                "output_dir",
                "seed",
            ],
            NoiseKind::Morphological => &["top_k", "chargram_length", "output_dir", "seed"],
            NoiseKind::CharacterLevel => &["seed"],
        }
    }
}

impl FromStr for NoiseKind {
    type Err = NoiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "phonological" => Ok(NoiseKind::Phonological),
            "lexical" => Ok(NoiseKind::Lexical),
            "morph" | "morphological" => Ok(NoiseKind::Morphological),
            "character_level" => Ok(NoiseKind::CharacterLevel),
            other => Err(NoiseError::Configuration(format!("unknown noise type '{other}'"))),
        }
    }
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated noiser configuration.
#[derive(Debug, Clone)]
pub enum NoiserConfig {
    Phonological(PhonologicalParams),
    Lexical(LexicalParams),
    Morphological(MorphologicalParams),
    CharacterLevel(CharacterLevelParams),
}

impl NoiserConfig {
    pub fn kind(&self) -> NoiseKind {
        match self {
            NoiserConfig::Phonological(_) => NoiseKind::Phonological,
            NoiserConfig::Lexical(_) => NoiseKind::Lexical,
            NoiserConfig::Morphological(_) => NoiseKind::Morphological,
            NoiserConfig::CharacterLevel(_) => NoiseKind::CharacterLevel,
        }
    }
}

/// Raw key/value parameters of one entry, with typed accessors.
struct RawParams {
    kind: NoiseKind,
    values: BTreeMap<String, String>,
}

impl RawParams {
    fn validate(&self) -> Result<()> {
        for key in self.values.keys() {
            if !self.kind.required().contains(&key.as_str())
                && !self.kind.optional().contains(&key.as_str())
            {
                return Err(NoiseError::Configuration(format!(
                    "unknown parameter '{key}' for {} noise",
                    self.kind
                )));
            }
        }
        for key in self.kind.required() {
            if !self.values.contains_key(*key) {
                return Err(NoiseError::Configuration(format!(
                    "missing required parameter '{key}' for {} noise",
                    self.kind
                )));
            }
        }
        Ok(())
    }

    fn string(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn required_string(&self, key: &str) -> Result<String> {
        self.string(key).ok_or_else(|| {
            NoiseError::Configuration(format!("missing required parameter '{key}'"))
        })
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        self.values.get(key).map(PathBuf::from)
    }

    fn required_path(&self, key: &str) -> Result<PathBuf> {
        self.required_string(key).map(PathBuf::from)
    }

    fn number<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
                NoiseError::Configuration(format!(
                    "parameter '{key}' of {} noise is not a valid number: '{raw}'",
                    self.kind
                ))
            }),
        }
    }

    fn required_number<T: FromStr>(&self, key: &str) -> Result<T> {
        self.number(key)?.ok_or_else(|| {
            NoiseError::Configuration(format!("missing required parameter '{key}'"))
        })
    }

    fn into_config(self) -> Result<NoiserConfig> {
        self.validate()?;
        let config = match self.kind {
            NoiseKind::Phonological => NoiserConfig::Phonological(PhonologicalParams {
                lang: self.required_string("lang")?,
                text_file: self.required_path("text_file")?,
                theta_phon: self.required_number("theta_phon")?,
                output_dir: self.path("output_dir"),
                seed: self.number("seed")?,
                ipa_classes: self.path("ipa_classes"),
            }),
            NoiseKind::Lexical => NoiserConfig::Lexical(LexicalParams {
                text_file: self.required_path("text_file")?,
                theta_global: self.required_number("theta_global")?,
                chargram_length: self.number("chargram_length")?,
                wordlist: self.path("wordlist"),
                theta_func: self.number("theta_func")?,
                theta_content: self.number("theta_content")?,
                output_dir: self.path("output_dir"),
                seed: self.number("seed")?,
            }),
            NoiseKind::Morphological => NoiserConfig::Morphological(MorphologicalParams {
                text_file: self.required_path("text_file")?,
                theta_morph: self.required_number("theta_morph")?,
                top_k: self.number("top_k")?,
                chargram_length: self.number("chargram_length")?,
                output_dir: self.path("output_dir"),
                seed: self.number("seed")?,
            }),
            NoiseKind::CharacterLevel => NoiserConfig::CharacterLevel(CharacterLevelParams {
                lang: self.required_string("lang")?,
                swap_theta: self.required_number("swap_theta")?,
                seed: self.number("seed")?,
            }),
        };
        Ok(config)
    }
}

/// Parse and validate a specification string.
///
/// An empty specification yields no noisers.
///
/// # Errors
/// Returns `Configuration` for malformed entries, unknown or duplicate noise
/// types, unknown or missing parameters and non-numeric numeric values.
pub fn parse(spec: &str) -> Result<Vec<NoiserConfig>> {
    if spec.trim().is_empty() {
        return Ok(Vec::new());
    }

    let protected_re =
        Regex::new(PROTECTED_VALUE).map_err(|e| NoiseError::Configuration(e.to_string()))?;
    let mut protected: VecDeque<String> = protected_re
        .captures_iter(spec)
        .map(|caps| caps[1].to_string())
        .collect();
    let masked = protected_re.replace_all(spec, PLACEHOLDER);

    let mut configs: Vec<NoiserConfig> = Vec::new();
    for entry in masked.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (kind, params) = entry.split_once('-').ok_or_else(|| {
            NoiseError::Configuration(format!("malformed noise entry '{entry}': expected type-params"))
        })?;
        let kind: NoiseKind = kind.parse()?;
        if configs.iter().any(|c| c.kind() == kind) {
            return Err(NoiseError::Configuration(format!(
                "noise type '{kind}' specified more than once"
            )));
        }

        let mut values = BTreeMap::new();
        for pair in params.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                NoiseError::Configuration(format!("malformed parameter '{pair}' in {kind} noise"))
            })?;
            let value = restore(value.trim(), &mut protected)?;
            values.insert(key.trim().to_string(), value);
        }

        configs.push(RawParams { kind, values }.into_config()?);
    }
    Ok(configs)
}

/// Put protected values back in the order they were masked.
fn restore(value: &str, protected: &mut VecDeque<String>) -> Result<String> {
    let mut restored = String::with_capacity(value.len());
    let mut pieces = value.split(PLACEHOLDER);
    if let Some(first) = pieces.next() {
        restored.push_str(first);
    }
    for piece in pieces {
        let original = protected.pop_front().ok_or_else(|| {
            NoiseError::Configuration("unbalanced <...> value in noise specification".into())
        })?;
        restored.push_str(&original);
        restored.push_str(piece);
    }
    Ok(restored)
}
