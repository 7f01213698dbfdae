//! Error taxonomy shared by the noisers, the composer and the posterior estimator.

use std::path::PathBuf;

/// Errors surfaced by noiser construction, composition and estimation.
///
/// Configuration and language errors are raised at construction time, before
/// any text is processed.
#[derive(Debug, thiserror::Error)]
pub enum NoiseError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("failed to read {}: {reason}", path.display())]
    CorpusRead { path: PathBuf, reason: String },

    #[error("no non-colliding candidate for '{word}' after {attempts} attempts")]
    GenerationExhausted { word: String, attempts: u32 },

    #[error("composition mismatch: {0}")]
    CompositionMismatch(String),

    #[error("failed to write artifact {}: {reason}", path.display())]
    ArtifactWrite { path: PathBuf, reason: String },
}

impl NoiseError {
    pub(crate) fn corpus_read(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CorpusRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn artifact_write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NoiseError>;
