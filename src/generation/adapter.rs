use std::time::Duration;

use tracing::{debug, instrument, warn};

use super::error::GenerationError;
use super::{GenerationParams, TextGenerator};
use crate::constants::DEFAULT_MAX_NEW_TOKENS;

/// Wraps a [`TextGenerator`] with the pipeline's decoding settings.
///
/// One call, no retries. A call that outlives the timeout yields empty text,
/// which the validator then rejects as too short, and its [`CancelFlag`](super::CancelFlag) is set
/// so a backend still decoding in the background stops.
#[derive(Debug)]
pub struct GenerationAdapter<G: TextGenerator> {
    generator: G,
    max_new_tokens: usize,
    timeout: Option<Duration>,
}

impl<G: TextGenerator> GenerationAdapter<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            timeout: None,
        }
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: usize) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn params(&self) -> GenerationParams {
        GenerationParams::for_kind(self.generator.kind(), self.max_new_tokens)
    }

    /// Generates and normalizes a continuation for `prompt`.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let params = self.params();

        let raw = match self.timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, self.generator.generate(prompt, &params)).await {
                    Ok(result) => result?,
                    Err(_) => {
                        params.cancel.cancel();
                        warn!(timeout_ms = limit.as_millis() as u64, "Generation timed out");
                        String::new()
                    }
                }
            }
            None => self.generator.generate(prompt, &params).await?,
        };

        let text = normalize_generation(&raw);
        debug!(raw_len = raw.len(), text_len = text.len(), "Generation normalized");
        Ok(text)
    }
}

/// `•` bullets become `-`, then surrounding whitespace is trimmed.
pub fn normalize_generation(raw: &str) -> String {
    raw.replace('•', "-").trim().to_string()
}
