//! Embedding + model utilities.
//!
//! - [`encoder`] turns a query into the vector used for index search.
//! - [`reranker`] scores (query, recipe) pairs with a cross-encoder.

/// BERT sequence-classification head used by the reranker.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Sentence encoder for queries.
pub mod encoder;
mod error;
/// Cross-encoder reranker.
pub mod reranker;
/// Tokenizer loading helpers.
pub mod utils;

pub use encoder::{QueryEncoder, QueryEncoderConfig};
pub use error::EmbeddingError;
pub use reranker::{Reranker, RerankerConfig, RerankerError};
