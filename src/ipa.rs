//! IPA equivalence resource.
//!
//! Two static pieces of data drive phonological noise:
//!
//! - a per-language mapping from script characters to one or more IPA symbols
//!   (a shared per-script table plus a handful of per-language overrides), and
//! - an IPA equivalence table grouping symbols considered phonetically close.
//!
//! Composing `char -> IPA -> equivalent IPA -> char` yields, for each script
//! character, the set of characters it may drift to.
//!
//! The built-in equivalence table can be replaced with a JSON file of the form
//! `{"p": ["b", "pʰ"], ...}`; the relation is made symmetric on load.

use crate::error::{NoiseError, Result};
use crate::script::{Language, Script};
use ahash::AHashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Groups of mutually equivalent IPA symbols. A symbol may sit in several groups.
const EQUIVALENCE_GROUPS: &[&[&str]] = &[
    // voicing
    &["p", "b"],
    &["t", "d"],
    &["k", "g"],
    &["f", "v"],
    &["s", "z"],
    &["ʃ", "ʒ"],
    &["tʃ", "dʒ"],
    &["θ", "ð"],
    &["x", "ɣ"],
    // place / manner drift
    &["θ", "s", "f"],
    &["ð", "d", "z"],
    &["ts", "s"],
    &["tʃ", "ʃ"],
    &["ʃ", "ʂ", "s", "ɕː"],
    &["x", "h", "ɦ", "ħ"],
    &["q", "k", "ʔ"],
    &["ʕ", "ʔ"],
    &["dʒ", "ʒ", "g"],
    &["b", "v", "ʋ", "w"],
    &["m", "n"],
    &["n", "ɲ", "ŋ", "ɳ"],
    &["l", "r", "ɾ", "ʁ"],
    &["j", "i"],
    // aspiration and retroflexion (Indic)
    &["k", "kʰ"],
    &["g", "gʱ"],
    &["tʃ", "tʃʰ"],
    &["dʒ", "dʒʱ"],
    &["ʈ", "ʈʰ"],
    &["ɖ", "ɖʱ"],
    &["ʈ", "ɖ"],
    &["ʈ", "t̪"],
    &["ɖ", "d̪"],
    &["t̪", "t̪ʰ"],
    &["d̪", "d̪ʱ"],
    &["t̪", "d̪"],
    &["p", "pʰ"],
    &["b", "bʱ"],
    // emphatics (Arabic)
    &["t", "tˤ"],
    &["d", "dˤ"],
    &["s", "sˤ"],
    &["ð", "ðˤ"],
    // vowels
    &["i", "ɪ", "iː"],
    &["i", "e", "ɨ"],
    &["e", "ɛ", "eː", "ɛː"],
    &["a", "æ", "ɑ", "aː", "ə"],
    &["o", "ɔ", "oː", "ɔː"],
    &["u", "ʊ", "uː"],
    &["o", "u"],
    &["y", "ø", "u"],
];

const LATIN: &[(char, &[&str])] = &[
    ('a', &["a", "æ", "ɑ"]),
    ('b', &["b"]),
    ('c', &["k", "s"]),
    ('d', &["d"]),
    ('e', &["e", "ɛ"]),
    ('f', &["f"]),
    ('g', &["g"]),
    ('h', &["h"]),
    ('i', &["i", "ɪ"]),
    ('j', &["dʒ"]),
    ('k', &["k"]),
    ('l', &["l"]),
    ('m', &["m"]),
    ('n', &["n"]),
    ('o', &["o", "ɔ"]),
    ('p', &["p"]),
    ('q', &["k"]),
    ('r', &["r"]),
    ('s', &["s"]),
    ('t', &["t"]),
    ('u', &["u", "ʊ"]),
    ('v', &["v"]),
    ('w', &["w"]),
    ('x', &["ks"]),
    ('y', &["j"]),
    ('z', &["z"]),
    ('à', &["a"]),
    ('á', &["a"]),
    ('â', &["ɑ"]),
    ('ä', &["ɛ"]),
    ('ç', &["s"]),
    ('è', &["ɛ"]),
    ('é', &["e"]),
    ('ê', &["ɛ"]),
    ('ë', &["ɛ"]),
    ('ì', &["i"]),
    ('í', &["i"]),
    ('î', &["i"]),
    ('ï', &["i"]),
    ('ñ', &["ɲ"]),
    ('ò', &["ɔ"]),
    ('ó', &["o"]),
    ('ô', &["o"]),
    ('ö', &["ø"]),
    ('ù', &["u"]),
    ('ú', &["u"]),
    ('û', &["u"]),
    ('ü', &["y"]),
    ('ß', &["s"]),
];

const DEVANAGARI: &[(char, &[&str])] = &[
    ('क', &["k"]),
    ('ख', &["kʰ"]),
    ('ग', &["g"]),
    ('घ', &["gʱ"]),
    ('ङ', &["ŋ"]),
    ('च', &["tʃ"]),
    ('छ', &["tʃʰ"]),
    ('ज', &["dʒ"]),
    ('झ', &["dʒʱ"]),
    ('ञ', &["ɲ"]),
    ('ट', &["ʈ"]),
    ('ठ', &["ʈʰ"]),
    ('ड', &["ɖ"]),
    ('ढ', &["ɖʱ"]),
    ('ण', &["ɳ"]),
    ('त', &["t̪"]),
    ('थ', &["t̪ʰ"]),
    ('द', &["d̪"]),
    ('ध', &["d̪ʱ"]),
    ('न', &["n"]),
    ('प', &["p"]),
    ('फ', &["pʰ", "f"]),
    ('ब', &["b"]),
    ('भ', &["bʱ"]),
    ('म', &["m"]),
    ('य', &["j"]),
    ('र', &["r"]),
    ('ल', &["l"]),
    ('व', &["ʋ"]),
    ('श', &["ʃ"]),
    ('ष', &["ʂ"]),
    ('स', &["s"]),
    ('ह', &["ɦ"]),
    ('अ', &["ə"]),
    ('आ', &["aː"]),
    ('इ', &["ɪ"]),
    ('ई', &["iː"]),
    ('उ', &["ʊ"]),
    ('ऊ', &["uː"]),
    ('ए', &["eː"]),
    ('ऐ', &["ɛː"]),
    ('ओ', &["oː"]),
    ('औ', &["ɔː"]),
    ('ा', &["aː"]),
    ('ि', &["ɪ"]),
    ('ी', &["iː"]),
    ('ु', &["ʊ"]),
    ('ू', &["uː"]),
    ('े', &["eː"]),
    ('ै', &["ɛː"]),
    ('ो', &["oː"]),
    ('ौ', &["ɔː"]),
];

const ARABIC: &[(char, &[&str])] = &[
    ('ب', &["b"]),
    ('ت', &["t"]),
    ('ث', &["θ"]),
    ('ج', &["dʒ"]),
    ('ح', &["ħ"]),
    ('خ', &["x"]),
    ('د', &["d"]),
    ('ذ', &["ð"]),
    ('ر', &["r"]),
    ('ز', &["z"]),
    ('س', &["s"]),
    ('ش', &["ʃ"]),
    ('ص', &["sˤ"]),
    ('ض', &["dˤ"]),
    ('ط', &["tˤ"]),
    ('ظ', &["ðˤ"]),
    ('ع', &["ʕ"]),
    ('غ', &["ɣ"]),
    ('ف', &["f"]),
    ('ق', &["q"]),
    ('ك', &["k"]),
    ('ل', &["l"]),
    ('م', &["m"]),
    ('ن', &["n"]),
    ('ه', &["h"]),
    ('و', &["w", "uː"]),
    ('ي', &["j", "iː"]),
    ('ا', &["aː"]),
    ('ى', &["aː"]),
    ('ء', &["ʔ"]),
    ('أ', &["ʔ"]),
    ('إ', &["ʔ"]),
];

const CYRILLIC: &[(char, &[&str])] = &[
    ('а', &["a"]),
    ('б', &["b"]),
    ('в', &["v"]),
    ('г', &["g"]),
    ('д', &["d"]),
    ('е', &["e"]),
    ('ё', &["o"]),
    ('ж', &["ʒ"]),
    ('з', &["z"]),
    ('и', &["i"]),
    ('й', &["j"]),
    ('к', &["k"]),
    ('л', &["l"]),
    ('м', &["m"]),
    ('н', &["n"]),
    ('о', &["o"]),
    ('п', &["p"]),
    ('р', &["r"]),
    ('с', &["s"]),
    ('т', &["t"]),
    ('у', &["u"]),
    ('ф', &["f"]),
    ('х', &["x"]),
    ('ц', &["ts"]),
    ('ч', &["tʃ"]),
    ('ш', &["ʃ"]),
    ('щ', &["ɕː"]),
    ('ы', &["ɨ"]),
    ('э', &["e"]),
];

/// Per-language deviations from the shared script table.
fn language_overrides(code: &str) -> &'static [(char, &'static [&'static str])] {
    match code {
        "deu" => &[
            ('w', &["v"]),
            ('v', &["f"]),
            ('z', &["ts"]),
            ('j', &["j"]),
        ],
        "spa" => &[
            ('j', &["x"]),
            ('v', &["b"]),
            ('z', &["θ"]),
            ('h', &[]),
        ],
        "fra" => &[('j', &["ʒ"]), ('u', &["y"]), ('r', &["ʁ"]), ('h', &[])],
        "ind" => &[('c', &["tʃ"]), ('y', &["j"])],
        _ => &[],
    }
}

/// Symmetric IPA equivalence relation.
#[derive(Debug, Clone)]
pub struct IpaTable {
    classes: AHashMap<String, BTreeSet<String>>,
}

impl IpaTable {
    /// The built-in equivalence table.
    pub fn builtin() -> Self {
        let mut table = Self {
            classes: AHashMap::new(),
        };
        for group in EQUIVALENCE_GROUPS {
            for a in group.iter() {
                for b in group.iter() {
                    table.link(a, b);
                }
            }
        }
        table
    }

    /// Load an equivalence table from JSON (`symbol -> [symbols]`).
    ///
    /// # Errors
    /// Returns `CorpusRead` if the file is unreadable or not a JSON object of string lists.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| NoiseError::corpus_read(path, e))?;
        let parsed: BTreeMap<String, Vec<String>> =
            serde_json::from_str(&raw).map_err(|e| NoiseError::corpus_read(path, e))?;

        let mut table = Self {
            classes: AHashMap::new(),
        };
        for (symbol, equivalents) in &parsed {
            let symbol = symbol.trim();
            table.link(symbol, symbol);
            for other in equivalents {
                table.link(symbol, other.trim());
                table.link(other.trim(), symbol);
            }
        }
        Ok(table)
    }

    fn link(&mut self, from: &str, to: &str) {
        self.classes
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    /// Symbols equivalent to `symbol`, always including `symbol` itself.
    pub fn equivalents(&self, symbol: &str) -> BTreeSet<String> {
        let mut out = self.classes.get(symbol).cloned().unwrap_or_default();
        out.insert(symbol.to_string());
        out
    }
}

/// Script-character <-> IPA mappings for one language.
#[derive(Debug, Clone)]
pub struct PhoneticInventory {
    char_to_ipa: BTreeMap<char, BTreeSet<String>>,
    ipa_to_char: BTreeMap<String, BTreeSet<char>>,
}

impl PhoneticInventory {
    pub fn for_language(language: &Language) -> Self {
        let base: &[(char, &[&str])] = match language.script() {
            Script::Latin => LATIN,
            Script::Devanagari => DEVANAGARI,
            Script::Arabic => ARABIC,
            Script::Cyrillic => CYRILLIC,
        };

        let mut char_to_ipa: BTreeMap<char, BTreeSet<String>> = BTreeMap::new();
        for (ch, symbols) in base {
            char_to_ipa.insert(*ch, symbols.iter().map(|s| s.to_string()).collect());
        }
        for (ch, symbols) in language_overrides(language.code()) {
            char_to_ipa.insert(*ch, symbols.iter().map(|s| s.to_string()).collect());
        }

        let mut ipa_to_char: BTreeMap<String, BTreeSet<char>> = BTreeMap::new();
        for (ch, symbols) in &char_to_ipa {
            for symbol in symbols {
                ipa_to_char.entry(symbol.clone()).or_default().insert(*ch);
            }
        }

        Self {
            char_to_ipa,
            ipa_to_char,
        }
    }

    pub fn ipa_for(&self, ch: char) -> Option<&BTreeSet<String>> {
        self.char_to_ipa.get(&ch)
    }

    pub fn chars_for(&self, symbol: &str) -> Option<&BTreeSet<char>> {
        self.ipa_to_char.get(symbol)
    }

    /// Compose `char -> IPA -> equivalent IPA -> char` for every known
    /// character, dropping self-maps. Characters with no equivalent
    /// counterpart map to an empty list.
    pub fn equivalence_targets(&self, table: &IpaTable) -> BTreeMap<char, Vec<char>> {
        let mut targets = BTreeMap::new();
        for (&ch, symbols) in &self.char_to_ipa {
            let mut reachable = BTreeSet::new();
            for symbol in symbols {
                for equivalent in table.equivalents(symbol) {
                    if let Some(chars) = self.chars_for(&equivalent) {
                        reachable.extend(chars.iter().copied());
                    }
                }
            }
            reachable.remove(&ch);
            targets.insert(ch, reachable.into_iter().collect());
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_symmetric() {
        let table = IpaTable::builtin();
        assert!(table.equivalents("p").contains("b"));
        assert!(table.equivalents("b").contains("p"));
        assert!(table.equivalents("zz").contains("zz"));
    }

    #[test]
    fn test_latin_targets() {
        let eng = Language::resolve("eng").unwrap();
        let inventory = PhoneticInventory::for_language(&eng);
        let targets = inventory.equivalence_targets(&IpaTable::builtin());

        assert_eq!(targets[&'p'], vec!['b']);
        assert!(targets[&'c'].contains(&'k'));
        assert!(targets[&'c'].contains(&'s'));
        assert!(!targets[&'c'].contains(&'c'));
        assert!(targets[&'x'].is_empty());
    }

    #[test]
    fn test_language_override() {
        let spa = Language::resolve("spa").unwrap();
        let inventory = PhoneticInventory::for_language(&spa);
        assert!(inventory.ipa_for('v').unwrap().contains("b"));
        let targets = inventory.equivalence_targets(&IpaTable::builtin());
        assert!(targets[&'v'].contains(&'b'));
        assert!(targets[&'h'].is_empty());
    }

    #[test]
    fn test_devanagari_aspiration_pairs() {
        let hin = Language::resolve("hin").unwrap();
        let inventory = PhoneticInventory::for_language(&hin);
        let targets = inventory.equivalence_targets(&IpaTable::builtin());
        assert!(targets[&'क'].contains(&'ख'));
        assert!(targets[&'ख'].contains(&'क'));
    }

    #[test]
    fn test_json_table_symmetrised() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipa.json");
        std::fs::write(&path, r#"{"p": ["f"]}"#).unwrap();

        let table = IpaTable::from_json_file(&path).unwrap();
        assert!(table.equivalents("f").contains("p"));
        assert!(!table.equivalents("p").contains("b"));
    }
}
