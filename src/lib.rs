//! Lingnoise - synthetic linguistic variation for robustness experiments.
//!
//! # Overview
//!
//! Lingnoise simulates the divergence between a high-resource language and a
//! closely related variety by applying seeded, parameterised noise to text:
//! - phonological noise replaces characters in fixed 3-character contexts,
//!   drawing on phonetic equivalence classes
//! - lexical noise replaces whole words by pseudowords from a character n-gram model
//! - morphological noise rewrites frequent suffixes
//! - character-level noise swaps single characters at random
//!
//! Noise is "global": replacements are decided once per context, word or suffix
//! when a noiser is built, so every occurrence in a corpus is changed the same way.
//!
//! The posterior estimator goes the other way. Given a bilingual lexicon it
//! estimates the parameters that would explain the observed divergence.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────────┐
//! │ Noise spec       │      │ Corpus           │
//! │ (noise_spec.rs)  │      │ (vocab.rs)       │
//! └────────┬─────────┘      └────────┬─────────┘
//!          │                         │
//!          ▼                         ▼
//! ┌──────────────────────────────────────────────┐
//! │ Noisers: phonological.rs, lexical.rs,        │
//! │ morphological.rs, character_level.rs         │
//! └────────────────────┬─────────────────────────┘
//!                      │
//!                      ▼
//! ┌──────────────────────────────────────────────┐
//! │ NoiseComposer (compose.rs)                   │ ← merges per-token outputs
//! └──────────────────────────────────────────────┘
//!
//! ┌──────────────────┐      ┌──────────────────┐
//! │ Lexicon          │ ───▶ │ Posterior        │ ← phon → morph → lexical
//! │ (lexicon.rs)     │      │ (posterior.rs)   │
//! └──────────────────┘      └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use lingnoise::{Config, NoiseComposer};
//!
//! let config = Config::default();
//! let composer = NoiseComposer::from_spec(
//!     "phonological-lang=hin,theta_phon=0.1,text_file=<hi.txt>",
//!     &config,
//! )?;
//! println!("{}", composer.apply("नमस्ते दुनिया")?);
//! # Ok::<(), lingnoise::NoiseError>(())
//! ```

pub mod artifacts;
pub mod character_level;
pub mod chargram;
pub mod compose;
pub mod config;
pub mod edit;
pub mod error;
pub mod ipa;
pub mod lexical;
pub mod lexicon;
pub mod logging;
pub mod morphological;
pub mod noise_spec;
pub mod phonological;
pub mod posterior;
pub mod script;
pub mod stem;
pub mod suffix;
pub mod token;
pub mod vocab;
pub mod wordlist;

pub use compose::{NoiseComposer, Noiser};
pub use config::Config;
pub use error::{NoiseError, Result};
pub use lexicon::BilingualLexicon;
pub use noise_spec::{NoiseKind, NoiserConfig};
pub use posterior::{Posterior, PosteriorEstimate};
