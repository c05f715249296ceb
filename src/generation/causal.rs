//! Local decoder-only generator (Qwen2 family) with greedy decoding.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::{LogitsProcessor, Sampling};
use candle_transformers::models::qwen2::{Config as Qwen2Config, ModelForCausalLM};
use candle_transformers::utils::apply_repeat_penalty;
use parking_lot::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use super::error::GenerationError;
use super::{GenerationParams, GeneratorKind, TextGenerator};
use crate::embedding::device::select_device;
use crate::embedding::utils::{load_tokenizer, missing_model_file};

const EOS_TOKENS: [&str; 3] = ["<|endoftext|>", "<|im_end|>", "</s>"];

struct CausalInner {
    model: Mutex<ModelForCausalLM>,
    tokenizer: Tokenizer,
    device: Device,
    eos_token_ids: Vec<u32>,
    model_path: PathBuf,
}

/// Decoder-only language model loaded from a safetensors checkpoint.
///
/// Cheap to clone. Decoding runs on the blocking pool and holds the model lock
/// for the whole call, since the KV cache is per-model. A cancelled call
/// releases the lock after at most one more forward step.
#[derive(Clone)]
pub struct CausalGenerator {
    inner: Arc<CausalInner>,
}

impl std::fmt::Debug for CausalGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CausalGenerator")
            .field("model_path", &self.inner.model_path)
            .field("device", &format!("{:?}", self.inner.device))
            .field("eos_token_ids", &self.inner.eos_token_ids)
            .finish()
    }
}

impl CausalGenerator {
    pub fn load(model_path: &Path) -> Result<Self, GenerationError> {
        if !model_path.exists() {
            return Err(GenerationError::ModelNotFound {
                path: model_path.to_path_buf(),
            });
        }
        if let Some(missing) = missing_model_file(model_path) {
            return Err(GenerationError::ModelLoadFailed {
                reason: format!("Missing {} in {}", missing, model_path.display()),
            });
        }

        let device =
            select_device("generator").map_err(|e| GenerationError::ModelLoadFailed {
                reason: e.to_string(),
            })?;

        let config_content = std::fs::read_to_string(model_path.join("config.json"))
            .map_err(|e| GenerationError::ModelLoadFailed {
                reason: format!("Failed to read config.json: {}", e),
            })?;
        let config: Qwen2Config =
            serde_json::from_str(&config_content).map_err(|e| GenerationError::ModelLoadFailed {
                reason: format!("Failed to parse config.json: {}", e),
            })?;

        let weights_path = model_path.join("model.safetensors");
        // SAFETY: the weights file is opened read-only and outlives the VarBuilder.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device) }
            .map_err(|e| GenerationError::ModelLoadFailed {
                reason: format!("Failed to map weights: {}", e),
            })?;
        let model = ModelForCausalLM::new(&config, vb).map_err(|e| {
            GenerationError::ModelLoadFailed {
                reason: format!("Failed to build causal LM: {}", e),
            }
        })?;

        let tokenizer = load_tokenizer(model_path).map_err(|e| GenerationError::ModelLoadFailed {
            reason: format!("Failed to load tokenizer: {}", e),
        })?;

        let eos_token_ids: Vec<u32> = EOS_TOKENS
            .iter()
            .filter_map(|token| tokenizer.token_to_id(token))
            .collect();

        info!(
            path = %model_path.display(),
            layers = config.num_hidden_layers,
            eos_tokens = eos_token_ids.len(),
            "Causal generator loaded"
        );

        Ok(Self {
            inner: Arc::new(CausalInner {
                model: Mutex::new(model),
                tokenizer,
                device,
                eos_token_ids,
                model_path: model_path.to_path_buf(),
            }),
        })
    }

    fn decode_blocking(
        inner: &CausalInner,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let encoding = inner.tokenizer.encode(prompt, true).map_err(|e| {
            GenerationError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let mut tokens: Vec<u32> = encoding.get_ids().to_vec();
        let prompt_len = tokens.len();
        if prompt_len == 0 {
            return Ok(String::new());
        }

        let mut model = inner.model.lock();
        model.clear_kv_cache();

        let mut processor = LogitsProcessor::from_sampling(0, Sampling::ArgMax);
        let mut cancelled = false;

        for step in 0..params.max_new_tokens {
            if params.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let (input, offset) = if step == 0 {
                (&tokens[..], 0)
            } else {
                let last = tokens.len() - 1;
                (&tokens[last..], last)
            };

            let input = Tensor::new(input, &inner.device)?.unsqueeze(0)?;
            let logits = model
                .forward(&input, offset)?
                .squeeze(0)?
                .squeeze(0)?
                .to_dtype(DType::F32)?;

            let logits = if (params.repetition_penalty - 1.0).abs() < f32::EPSILON {
                logits
            } else {
                apply_repeat_penalty(&logits, params.repetition_penalty, &tokens)?
            };

            let next = processor.sample(&logits)?;
            if inner.eos_token_ids.contains(&next) {
                break;
            }
            tokens.push(next);
        }

        model.clear_kv_cache();
        drop(model);

        let generated = continuation(&tokens, prompt_len);
        if cancelled {
            debug!(
                new_tokens = generated.len(),
                "Decoding cancelled, partial output discarded"
            );
            return Ok(String::new());
        }

        debug!(
            prompt_tokens = prompt_len,
            new_tokens = generated.len(),
            "Greedy decoding finished"
        );

        inner
            .tokenizer
            .decode(generated, true)
            .map_err(|e| GenerationError::TokenizationFailed {
                reason: e.to_string(),
            })
    }
}

impl TextGenerator for CausalGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::DecoderOnly
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let inner = Arc::clone(&self.inner);
        let prompt = prompt.to_string();
        let params = params.clone();

        tokio::task::spawn_blocking(move || Self::decode_blocking(&inner, &prompt, &params))
            .await
            .map_err(|e| GenerationError::DecodingFailed {
                reason: format!("decode task failed: {}", e),
            })?
    }
}

/// Tokens produced after the prompt; the prompt itself is never echoed back.
pub fn continuation(tokens: &[u32], prompt_len: usize) -> &[u32] {
    tokens.get(prompt_len..).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuation_skips_prompt() {
        let tokens = [10, 11, 12, 99, 98];
        assert_eq!(continuation(&tokens, 3), &[99, 98]);
    }

    #[test]
    fn test_continuation_nothing_generated() {
        let tokens = [10, 11];
        assert!(continuation(&tokens, 2).is_empty());
        assert!(continuation(&tokens, 5).is_empty());
    }

    #[test]
    fn test_load_missing_dir() {
        let err = CausalGenerator::load(Path::new("/no/such/generator")).unwrap_err();
        assert!(matches!(err, GenerationError::ModelNotFound { .. }));
    }

    #[test]
    fn test_load_incomplete_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();

        let err = CausalGenerator::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("model.safetensors"));
    }
}
