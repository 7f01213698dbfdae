//! Stem-sharing heuristic.
//!
//! Two words share a stem when, after lowercasing and punctuation stripping,
//! their longest common prefix is at least two characters long and covers at
//! least a third of the source word. For Hindi the first characters only need
//! to match. This is an approximation, not a morphological analyzer: short
//! unrelated words with a common onset are false positives, and stems changed
//! by phonological drift in their first characters are false negatives.

/// Punctuation stripped before comparing stems.
const STEM_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '?', '!', '-', '_', '(', ')', '[', ']', '{', '}', '"', '\'', '`', '~',
    '@', '#', '$', '%', '^', '&', '*', '+', '=', '|', '\\', '<', '>', '/',
];

/// Length in characters of the longest common prefix of `a` and `b`.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

/// Whether `src` and `tgt` share a stem under the rules for language `lang`.
pub fn same_stem(src: &str, tgt: &str, lang: &str) -> bool {
    let src = src.to_lowercase();
    let tgt = tgt.to_lowercase();
    let src = src.trim_matches(STEM_PUNCTUATION);
    let tgt = tgt.trim_matches(STEM_PUNCTUATION);

    if lang == "hin" {
        return match (src.chars().next(), tgt.chars().next()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
    }

    let lcp = common_prefix_len(src, tgt);
    let src_len = src.chars().count();
    lcp >= 2 && 3 * lcp >= src_len
}
