//! Script and character-set registry.
//!
//! Maps a language code to its writing system and the set of characters that
//! count as "in script" for noising. Codes are normalized through a fixed alias
//! table, so `en`, `eng` and ` ENG ` all resolve to the same descriptor.

use crate::error::{NoiseError, Result};
use ahash::AHashSet;
use serde::Serialize;
use std::fmt;

/// Writing systems known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Latin,
    Devanagari,
    Arabic,
    Cyrillic,
}

impl Script {
    /// Characters belonging to the script, in code point order.
    pub fn characters(self) -> Vec<char> {
        match self {
            Script::Latin => ('A'..='Z')
                .chain('a'..='z')
                .chain('\u{00C0}'..='\u{00FF}')
                .filter(|c| *c != '\u{00D7}' && *c != '\u{00F7}')
                .collect(),
            Script::Devanagari => ('\u{0900}'..='\u{097F}').collect(),
            Script::Arabic => ('\u{0600}'..='\u{06FF}').collect(),
            Script::Cyrillic => ('\u{0400}'..='\u{04FF}').collect(),
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Script::Latin => "latin",
            Script::Devanagari => "devanagari",
            Script::Arabic => "arabic",
            Script::Cyrillic => "cyrillic",
        };
        f.write_str(name)
    }
}

/// (alias, canonical code, script)
const REGISTRY: &[(&str, &str, Script)] = &[
    ("eng", "eng", Script::Latin),
    ("en", "eng", Script::Latin),
    ("deu", "deu", Script::Latin),
    ("de", "deu", Script::Latin),
    ("spa", "spa", Script::Latin),
    ("es", "spa", Script::Latin),
    ("esp", "spa", Script::Latin),
    ("fra", "fra", Script::Latin),
    ("fr", "fra", Script::Latin),
    ("ind", "ind", Script::Latin),
    ("id", "ind", Script::Latin),
    ("hin", "hin", Script::Devanagari),
    ("hi", "hin", Script::Devanagari),
    ("arb", "arb", Script::Arabic),
    ("ar", "arb", Script::Arabic),
    ("ara", "arb", Script::Arabic),
    ("rus", "rus", Script::Cyrillic),
    ("ru", "rus", Script::Cyrillic),
];

/// An immutable language descriptor: canonical code, script and legal characters.
#[derive(Debug, Clone)]
pub struct Language {
    code: &'static str,
    script: Script,
    characters: Vec<char>,
    lookup: AHashSet<char>,
}

impl Language {
    /// Resolve a language code through the alias table.
    ///
    /// # Errors
    /// Returns `UnsupportedLanguage` if the code is not registered.
    pub fn resolve(lang_code: &str) -> Result<Self> {
        let normalized = lang_code.trim().to_lowercase();
        let (_, code, script) = REGISTRY
            .iter()
            .find(|(alias, _, _)| *alias == normalized)
            .ok_or_else(|| NoiseError::UnsupportedLanguage(lang_code.to_string()))?;

        let characters = script.characters();
        let lookup = characters.iter().copied().collect();
        Ok(Self {
            code: *code,
            script: *script,
            characters,
            lookup,
        })
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn script(&self) -> Script {
        self.script
    }

    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    pub fn contains(&self, ch: char) -> bool {
        self.lookup.contains(&ch)
    }

    /// True when every character of `word` is in the script (and `word` is non-empty).
    pub fn is_valid_word(&self, word: &str) -> bool {
        !word.is_empty() && word.chars().all(|c| self.contains(c))
    }

    /// Characters usable as a context-free replacement for `original`:
    /// same case as the original, excluding the original itself.
    pub fn replacement_pool(&self, original: char) -> Vec<char> {
        let upper = original.is_uppercase();
        self.characters
            .iter()
            .copied()
            .filter(|&c| c != original)
            .filter(|&c| !c.is_alphabetic() || c.is_uppercase() == upper)
            .collect()
    }
}
