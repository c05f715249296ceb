use thiserror::Error;

use crate::generation::GenerationError;
use crate::retrieval::RetrievalError;

/// Broken dependencies. Bad generations never show up here; they end in a fallback.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}
