use std::path::PathBuf;

use thiserror::Error;

/// Hard generation failures. A timeout is not an error: the adapter maps it to empty text.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generator model not found at {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load generator: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("decoding failed: {reason}")]
    DecodingFailed { reason: String },

    #[error("generation provider '{model}' failed: {reason}")]
    Provider { model: String, reason: String },

    #[error("generator unavailable: {reason}")]
    Unavailable { reason: String },
}

impl From<candle_core::Error> for GenerationError {
    fn from(err: candle_core::Error) -> Self {
        GenerationError::DecodingFailed {
            reason: err.to_string(),
        }
    }
}
