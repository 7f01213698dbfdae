//! Token helpers shared by the word-level noisers.

/// A whitespace token split into leading punctuation, core and trailing punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub lead: &'a str,
    pub core: &'a str,
    pub trail: &'a str,
}

impl<'a> Token<'a> {
    pub fn split(token: &'a str, punctuation: &[char]) -> Self {
        let core_start = token.len() - token.trim_start_matches(punctuation).len();
        let lead = &token[..core_start];
        let rest = &token[core_start..];
        let core = rest.trim_end_matches(punctuation);
        let trail = &rest[core.len()..];
        Self { lead, core, trail }
    }

    /// Reassemble with a replacement core, keeping the original punctuation.
    pub fn rebuild(&self, core: &str) -> String {
        format!("{}{}{}", self.lead, core, self.trail)
    }

    pub fn starts_uppercase(&self) -> bool {
        self.core.chars().next().is_some_and(char::is_uppercase)
    }
}

/// Single-character lowercase, or the character itself when the mapping expands.
pub fn lower_char(c: char) -> char {
    let mut lowered = c.to_lowercase();
    match (lowered.next(), lowered.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Single-character uppercase, or the character itself when the mapping expands.
pub fn upper_char(c: char) -> char {
    let mut uppered = c.to_uppercase();
    match (uppered.next(), uppered.next()) {
        (Some(u), None) => u,
        _ => c,
    }
}

/// Uppercase the first character of `word`.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
