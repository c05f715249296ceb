use std::sync::Arc;

use crate::answer::AnswerEngine;
use crate::generation::TextGenerator;
use crate::vectordb::VectorDbClient;

/// Shared handler state. The engine (and the models inside it) is loaded once.
pub struct AppState<V: VectorDbClient, G: TextGenerator> {
    pub engine: Arc<AnswerEngine<V, G>>,

    /// Used when a request omits `top_k`.
    pub default_top_k: u64,
}

impl<V: VectorDbClient, G: TextGenerator> AppState<V, G> {
    pub fn new(engine: AnswerEngine<V, G>, default_top_k: u64) -> Self {
        Self {
            engine: Arc::new(engine),
            default_top_k,
        }
    }
}

impl<V: VectorDbClient, G: TextGenerator> Clone for AppState<V, G> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            default_top_k: self.default_top_k,
        }
    }
}
