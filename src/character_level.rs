//! Character-level swap noise.
//!
//! Unlike the global noisers this one has no committed map: each in-script
//! character is independently swapped, with probability `swap_theta`, for a
//! different character of the same script. The random stream is seeded from
//! the configured seed and the sentence itself, so the same sentence is always
//! noised the same way regardless of the order sentences are processed in.

use crate::config::Config;
use crate::error::Result;
use crate::script::Language;
use ahash::RandomState;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

const SENTENCE_HASH_SEEDS: (u64, u64, u64, u64) = (
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
);

/// Validated parameters for [`CharacterLevelNoiser`].
#[derive(Debug, Clone)]
pub struct CharacterLevelParams {
    pub lang: String,
    pub swap_theta: f64,
    pub seed: Option<u64>,
}

pub struct CharacterLevelNoiser {
    language: Language,
    swap_theta: f64,
    seed: u64,
    hasher: RandomState,
}

impl CharacterLevelNoiser {
    pub fn new(params: &CharacterLevelParams, config: &Config) -> Result<Self> {
        let language = Language::resolve(&params.lang)?;
        if !(0.0..=1.0).contains(&params.swap_theta) {
            warn!(swap_theta = params.swap_theta, "swap_theta outside [0, 1]");
        }
        info!(lang = language.code(), swap_theta = params.swap_theta, "character noiser ready");

        let (k0, k1, k2, k3) = SENTENCE_HASH_SEEDS;
        Ok(Self {
            language,
            swap_theta: params.swap_theta,
            seed: params.seed.unwrap_or(config.seed),
            hasher: RandomState::with_seeds(k0, k1, k2, k3),
        })
    }

    pub fn apply_noise(&self, input: &str) -> String {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ self.hasher.hash_one(input));
        let alphabet = self.language.characters();

        input
            .chars()
            .map(|ch| {
                if !self.language.contains(ch) || rng.gen::<f64>() >= self.swap_theta {
                    return ch;
                }
                let pool: Vec<char> = alphabet.iter().copied().filter(|&c| c != ch).collect();
                pool.choose(&mut rng).copied().unwrap_or(ch)
            })
            .collect()
    }
}

impl std::fmt::Debug for CharacterLevelNoiser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterLevelNoiser")
            .field("lang", &self.language.code())
            .field("swap_theta", &self.swap_theta)
            .field("seed", &self.seed)
            .finish()
    }
}
