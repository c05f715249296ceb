use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::debug;

use super::error::GenerationError;
use super::{GenerationParams, GeneratorKind, TextGenerator};

/// Chat-completion provider resolved by `genai` from the model name.
///
/// The reply is taken whole as the continuation. Providers do not expose a
/// repetition penalty, so only the token budget and zero temperature are sent.
#[derive(Clone)]
pub struct RemoteGenerator {
    client: Client,
    model: String,
}

impl std::fmt::Debug for RemoteGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteGenerator")
            .field("model", &self.model)
            .finish()
    }
}

impl RemoteGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for RemoteGenerator {
    fn kind(&self) -> GeneratorKind {
        GeneratorKind::EncoderDecoder
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let options = ChatOptions::default()
            .with_temperature(0.0)
            .with_max_tokens(u32::try_from(params.max_new_tokens).unwrap_or(u32::MAX));

        debug!(model = %self.model, prompt_len = prompt.len(), "Calling remote generator");

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&options))
            .await
            .map_err(|e| GenerationError::Provider {
                model: self.model.clone(),
                reason: e.to_string(),
            })?;

        Ok(response.first_text().unwrap_or_default().to_string())
    }
}
