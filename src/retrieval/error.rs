use thiserror::Error;

use crate::embedding::{EmbeddingError, RerankerError};
use crate::vectordb::VectorDbError;

/// Hard retrieval failures: the answer pipeline never turns these into canned text.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("query encoding failed: {0}")]
    Encoding(#[from] EmbeddingError),

    #[error("recipe index unavailable: {0}")]
    Index(#[from] VectorDbError),

    #[error("reranking failed: {0}")]
    Rerank(#[from] RerankerError),
}
