//! Query encoder (BERT sentence embeddings, mean pooled + L2 normalized).
//!
//! The recipe index stores normalized vectors, so the inner product of a query vector
//! with a stored vector is its cosine similarity. Use [`QueryEncoderConfig::stub`] for
//! tests without model files.

use std::path::PathBuf;

use candle_core::{DType, Device, Tensor};
use candle_transformers::models::bert::BertModel;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_EMBEDDING_DIM, ENCODER_MAX_SEQ_LEN};
use crate::embedding::bert::{load_bert_trunk, open_bert_checkpoint};
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::{load_tokenizer_with_truncation, missing_model_file};

/// Configuration for [`QueryEncoder`].
#[derive(Debug, Clone)]
pub struct QueryEncoderConfig {
    /// Model directory (`config.json`, `model.safetensors`, `tokenizer.json`).
    pub model_path: Option<PathBuf>,
    /// Output dimension; must match the model's hidden size and the index.
    pub embedding_dim: usize,
    /// Max tokens considered per query.
    pub max_seq_len: usize,
}

impl Default for QueryEncoderConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            max_seq_len: ENCODER_MAX_SEQ_LEN,
        }
    }
}

impl QueryEncoderConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    /// Deterministic hash-seeded vectors, no model files.
    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be greater than zero".to_string(),
            });
        }
        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

enum EncoderBackend {
    Model {
        model: BertModel,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Sentence encoder used by the retrieval gateway.
pub struct QueryEncoder {
    backend: EncoderBackend,
    config: QueryEncoderConfig,
}

impl std::fmt::Debug for QueryEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEncoder")
            .field(
                "backend",
                &match &self.backend {
                    EncoderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EncoderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .finish()
    }
}

impl QueryEncoder {
    /// Loads the encoder (stub mode when no model path is configured).
    pub fn load(config: QueryEncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let Some(model_path) = config.model_path.clone() else {
            warn!("No encoder model configured, running query encoder in STUB mode");
            return Ok(Self {
                backend: EncoderBackend::Stub,
                config,
            });
        };

        if !model_path.exists() {
            return Err(EmbeddingError::ModelNotFound { path: model_path });
        }
        if let Some(missing) = missing_model_file(&model_path) {
            return Err(EmbeddingError::ModelLoadFailed {
                reason: format!("Missing {} in {}", missing, model_path.display()),
            });
        }

        let device = select_device("encoder")?;

        let (bert_config, vb) = open_bert_checkpoint(&model_path, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to open encoder checkpoint: {}", e),
            }
        })?;

        if bert_config.hidden_size != config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) does not match model hidden_size ({})",
                    config.embedding_dim, bert_config.hidden_size
                ),
            });
        }

        let model =
            load_bert_trunk(&vb, &bert_config).map_err(|e| EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load BERT encoder: {}", e),
            })?;

        let tokenizer = load_tokenizer_with_truncation(&model_path, config.max_seq_len)
            .map_err(|e| EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            })?;

        info!(
            model_path = %model_path.display(),
            embedding_dim = config.embedding_dim,
            "Query encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
        })
    }

    pub fn stub() -> Self {
        Self {
            backend: EncoderBackend::Stub,
            config: QueryEncoderConfig::stub(),
        }
    }

    /// Encodes `text` into a unit-length vector.
    pub fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let raw = match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.encode_with_model(text, model, tokenizer, device)?,
            EncoderBackend::Stub => self.encode_stub(text),
        };
        Ok(l2_normalize(raw))
    }

    fn encode_with_model(
        &self,
        text: &str,
        model: &BertModel,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        if encoding.get_ids().is_empty() {
            return Ok(vec![0.0; self.config.embedding_dim]);
        }

        debug!(
            text_len = text.len(),
            token_count = encoding.get_ids().len(),
            "Encoding query"
        );

        let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;

        // [1, seq_len, hidden]
        let hidden = model.forward(&input_ids, &type_ids, Some(&attention_mask))?;

        // Mean pooling over real (unmasked) tokens.
        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;

        Ok(pooled.squeeze(0)?.to_vec1::<f32>()?)
    }

    fn encode_stub(&self, text: &str) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish();

        (0..self.config.embedding_dim)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }

    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }
}

fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}
