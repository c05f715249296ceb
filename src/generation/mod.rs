//! Text generation: the capability trait, its backends, and the adapter the
//! answer pipeline calls.
//!
//! Backends:
//! - [`CausalGenerator`]: local decoder-only model, greedy decoding, prompt stripped from output.
//! - [`RemoteGenerator`]: chat provider via `genai`; the whole reply is the continuation.
//! - [`Generator::Stub`]: always returns empty text, so every answer goes through fallbacks.

pub mod adapter;
pub mod causal;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod remote;


pub use adapter::{GenerationAdapter, normalize_generation};
pub use causal::CausalGenerator;
pub use error::GenerationError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockGenerator;
pub use remote::RemoteGenerator;

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::config::Config;
use crate::constants::{CAUSAL_REPETITION_PENALTY, SEQ2SEQ_REPETITION_PENALTY};

/// Model architecture, which decides the repetition penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    DecoderOnly,
    EncoderDecoder,
}

impl GeneratorKind {
    pub fn repetition_penalty(self) -> f32 {
        match self {
            GeneratorKind::DecoderOnly => CAUSAL_REPETITION_PENALTY,
            GeneratorKind::EncoderDecoder => SEQ2SEQ_REPETITION_PENALTY,
        }
    }
}

/// Shared stop signal for one generation call.
///
/// Set by the caller once the result is no longer wanted. Backends that decode
/// step by step check it before every step and give up the model early.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Decoding settings for one call. Decoding is always greedy.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub max_new_tokens: usize,
    pub repetition_penalty: f32,
    pub cancel: CancelFlag,
}

impl GenerationParams {
    pub fn for_kind(kind: GeneratorKind, max_new_tokens: usize) -> Self {
        Self {
            max_new_tokens,
            repetition_penalty: kind.repetition_penalty(),
            cancel: CancelFlag::new(),
        }
    }
}

/// Prompt in, continuation out.
pub trait TextGenerator: Send + Sync {
    fn kind(&self) -> GeneratorKind;

    /// Returns only newly generated text, never the prompt.
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// Generator chosen at startup from configuration.
#[derive(Debug, Clone)]
pub enum Generator {
    Local(CausalGenerator),
    Remote(RemoteGenerator),
    Stub,
}

impl Generator {
    /// Local model if a path is set, else a remote model name, else the stub.
    pub fn from_config(config: &Config) -> Result<Self, GenerationError> {
        if config.mock_provider {
            warn!("Mock provider enabled, generator disabled");
            return Ok(Generator::Stub);
        }

        if let Some(path) = &config.generator_path {
            return Ok(Generator::Local(CausalGenerator::load(path)?));
        }

        if let Some(model) = &config.generator_model {
            info!(model = %model, "Using remote generator");
            return Ok(Generator::Remote(RemoteGenerator::new(model.clone())));
        }

        warn!("No generator configured, answers will use extractive fallbacks");
        Ok(Generator::Stub)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Generator::Local(_) => "local",
            Generator::Remote(_) => "remote",
            Generator::Stub => "stub",
        }
    }
}

impl TextGenerator for Generator {
    fn kind(&self) -> GeneratorKind {
        match self {
            Generator::Local(g) => g.kind(),
            Generator::Remote(g) => g.kind(),
            Generator::Stub => GeneratorKind::EncoderDecoder,
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        match self {
            Generator::Local(g) => g.generate(prompt, params).await,
            Generator::Remote(g) => g.generate(prompt, params).await,
            Generator::Stub => Ok(String::new()),
        }
    }
}
