use std::path::PathBuf;

pub use crate::constants::RERANKER_MAX_SEQ_LEN as MAX_SEQ_LEN;

#[derive(Debug, Clone, Default)]
pub struct RerankerConfig {
    /// Cross-encoder directory; `None` runs the lexical stub.
    pub model_path: Option<PathBuf>,
}

impl RerankerConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
        }
    }

    pub fn stub() -> Self {
        Self { model_path: None }
    }

    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err("model_path cannot be empty when provided".to_string());
        }

        Ok(())
    }
}
