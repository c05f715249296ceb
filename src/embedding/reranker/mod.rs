pub mod config;
pub mod error;

#[cfg(test)]
mod tests;

pub use config::{MAX_SEQ_LEN, RerankerConfig};
pub use error::RerankerError;

use std::cmp::Ordering;
use std::collections::HashSet;

use candle_core::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::embedding::bert::CrossEncoderModel;
use crate::embedding::device::select_device;
use crate::embedding::utils::{load_tokenizer_with_truncation, missing_model_file};

/// Cross-encoder that scores (query, recipe text) pairs.
///
/// Without a model directory it runs a lexical stub so the gateway and tests keep working.
pub struct Reranker {
    device: candle_core::Device,
    config: RerankerConfig,
    model: Option<(CrossEncoderModel, Tokenizer)>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("device", &format!("{:?}", self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl Reranker {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(reason) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason });
        }

        let device = select_device("reranker")?;

        let Some(model_path) = config.model_path.clone() else {
            info!("No reranker model path configured, operating in stub mode");
            return Ok(Self {
                device,
                config,
                model: None,
            });
        };

        if !model_path.exists() {
            return Err(RerankerError::ModelLoadFailed {
                reason: format!("Reranker model path not found: {}", model_path.display()),
            });
        }
        if let Some(missing) = missing_model_file(&model_path) {
            return Err(RerankerError::ModelLoadFailed {
                reason: format!("Missing {} in {}", missing, model_path.display()),
            });
        }

        info!(model_path = %model_path.display(), "Loading reranker model");

        let model = CrossEncoderModel::load(&model_path, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load cross-encoder: {}", e),
            }
        })?;

        let tokenizer = load_tokenizer_with_truncation(&model_path, MAX_SEQ_LEN).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        info!("Reranker model loaded successfully");

        Ok(Self {
            device,
            config,
            model: Some((model, tokenizer)),
        })
    }

    pub fn stub() -> Result<Self, RerankerError> {
        Self::load(RerankerConfig::stub())
    }

    /// Scores one pair; higher means more relevant.
    pub fn score(&self, query: &str, candidate: &str) -> Result<f32, RerankerError> {
        let Some((model, tokenizer)) = &self.model else {
            return Ok(lexical_stub_score(query, candidate));
        };

        let tokens = tokenizer.encode((query, candidate), true).map_err(|e| {
            RerankerError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let token_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(tokens.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = model
            .forward(&token_ids, &type_ids, Some(&attention_mask))
            .map_err(|e| RerankerError::InferenceFailed {
                reason: e.to_string(),
            })?;

        let scores = logits.flatten_all()?.to_vec1::<f32>()?;
        scores
            .first()
            .copied()
            .ok_or_else(|| RerankerError::InferenceFailed {
                reason: "cross-encoder returned no logits".to_string(),
            })
    }

    /// Scores every candidate and returns `(index, score)` sorted by descending score.
    ///
    /// The sort is stable: candidates with equal scores keep their incoming order.
    pub fn rerank(
        &self,
        query: &str,
        candidates: &[&str],
    ) -> Result<Vec<(usize, f32)>, RerankerError> {
        debug!(
            query_len = query.len(),
            num_candidates = candidates.len(),
            model_loaded = self.is_model_loaded(),
            "Reranking candidates"
        );

        let mut scored: Vec<(usize, f32)> = candidates
            .iter()
            .enumerate()
            .map(|(idx, candidate)| Ok((idx, self.score(query, candidate)?)))
            .collect::<Result<Vec<_>, RerankerError>>()?;

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        debug!(
            top_score = scored.first().map(|(_, s)| *s),
            "Reranking complete"
        );

        Ok(scored)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }
}

/// Fraction of the query's words that also appear in the candidate.
fn lexical_stub_score(query: &str, candidate: &str) -> f32 {
    fn words(text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
            .map(str::to_string)
            .collect()
    }

    let query_words = words(query);
    if query_words.is_empty() {
        return 0.0;
    }

    let candidate_words = words(candidate);
    let hits = query_words.intersection(&candidate_words).count();
    hits as f32 / query_words.len() as f32
}
