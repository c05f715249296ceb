use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::error::GenerationError;
use super::{GenerationParams, GeneratorKind, TextGenerator};

enum Scripted {
    Text(String),
    Fail(String),
    Decode { text: String, steps: usize },
}

const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(10);

/// Scripted generator for tests.
///
/// Replies are consumed in order; once the script runs out every call returns
/// the fallback text (empty unless set).
pub struct MockGenerator {
    kind: GeneratorKind,
    script: Mutex<VecDeque<Scripted>>,
    fallback: String,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    // Held for a whole step-wise decode, like a local model's weights.
    model_lock: Arc<tokio::sync::Mutex<()>>,
    step_delay: Duration,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            kind: GeneratorKind::DecoderOnly,
            script: Mutex::new(VecDeque::new()),
            fallback: String::new(),
            delay: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            model_lock: Arc::new(tokio::sync::Mutex::new(())),
            step_delay: DEFAULT_STEP_DELAY,
        }
    }

    /// Always answers with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            fallback: text.into(),
            ..Self::new()
        }
    }

    pub fn with_kind(mut self, kind: GeneratorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Queues one reply.
    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.script.lock().push_back(Scripted::Text(text.into()));
        self
    }

    /// Queues one hard failure.
    pub fn then_fail(self, reason: impl Into<String>) -> Self {
        self.script.lock().push_back(Scripted::Fail(reason.into()));
        self
    }

    /// Queues one reply produced by a detached step-wise decode.
    ///
    /// The decode holds the generator's model lock for `steps` steps and checks
    /// the call's cancel flag before each one. A cancelled decode yields empty text.
    pub fn then_decode(self, text: impl Into<String>, steps: usize) -> Self {
        self.script.lock().push_back(Scripted::Decode {
            text: text.into(),
            steps,
        });
        self
    }

    pub fn with_step_delay(mut self, step_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self
    }

    /// Sleeps before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

impl TextGenerator for MockGenerator {
    fn kind(&self) -> GeneratorKind {
        self.kind
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.script.lock().pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Fail(reason)) => Err(GenerationError::Unavailable { reason }),
            Some(Scripted::Decode { text, steps }) => {
                let model_lock = Arc::clone(&self.model_lock);
                let cancel = params.cancel.clone();
                let step_delay = self.step_delay;

                tokio::spawn(async move {
                    let _model = model_lock.lock().await;
                    for _ in 0..steps {
                        if cancel.is_cancelled() {
                            return String::new();
                        }
                        tokio::time::sleep(step_delay).await;
                    }
                    text
                })
                .await
                .map_err(|e| GenerationError::DecodingFailed {
                    reason: format!("decode task failed: {}", e),
                })
            }
            None => Ok(self.fallback.clone()),
        }
    }
}
