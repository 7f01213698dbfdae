use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Run-wide defaults handed to every noiser and to the posterior estimator.
///
/// Individual noise specifications may override `seed`, `chargram_length`
/// and `top_k_suffixes` per noiser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub seed: u64,
    pub max_generation_attempts: u32,
    pub chargram_length: usize,
    pub top_k_suffixes: usize,
    pub default_ned_threshold: f64,
    pub ned_thresholds: BTreeMap<String, f64>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let ned_thresholds = [("hin", 0.5), ("spa", 0.4), ("deu", 0.4)]
            .into_iter()
            .map(|(lang, threshold)| (lang.to_string(), threshold))
            .collect();

        Self {
            seed: 42,
            max_generation_attempts: 1000,
            chargram_length: 3,
            top_k_suffixes: 200,
            default_ned_threshold: 0.4,
            ned_thresholds,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, confy::ConfyError> {
        match confy::load("lingnoise", Some("config")) {
            Ok(config) => Ok(config),
            Err(err) => {
                eprintln!("Failed to load config, using defaults: {err}");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, confy::ConfyError> {
        confy::load_path(path)
    }

    /// Normalized edit distance above which a pair is no longer explained by
    /// phonological change.
    pub fn ned_threshold(&self, lang: &str) -> f64 {
        self.ned_thresholds
            .get(lang)
            .copied()
            .unwrap_or(self.default_ned_threshold)
    }
}
