//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `BAKECHAT_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{DEFAULT_MAX_NEW_TOKENS, DEFAULT_TOP_K, MAX_TOP_K, MIN_TOP_K};

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `BAKECHAT_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Collection holding the recipe vectors and metadata. Default: `recipes`.
    pub collection: String,

    /// Sentence encoder directory (BERT config + safetensors + tokenizer).
    pub embedder_path: Option<PathBuf>,

    /// Cross-encoder reranker directory (BERT + tokenizer).
    pub reranker_path: Option<PathBuf>,

    /// Local decoder-only generator directory (Qwen2 config + safetensors + tokenizer).
    pub generator_path: Option<PathBuf>,

    /// Remote generator model name (resolved by `genai`).
    pub generator_model: Option<String>,

    /// Generation budget in new tokens. Default: `90`.
    pub max_new_tokens: usize,

    /// Default retrieval depth. Default: `20`.
    pub top_k: u64,

    /// Wall-clock limit for one generation call. Default: 60s.
    pub generation_timeout: Duration,

    /// Skip the generator entirely (every answer goes through validation fallbacks).
    pub mock_provider: bool,
}

/// Default Qdrant URL used when `BAKECHAT_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Default recipe collection name.
pub const DEFAULT_COLLECTION: &str = "recipes";

const DEFAULT_GENERATION_TIMEOUT_MS: u64 = 60_000;

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            embedder_path: None,
            reranker_path: None,
            generator_path: None,
            generator_model: None,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            top_k: DEFAULT_TOP_K,
            generation_timeout: Duration::from_millis(DEFAULT_GENERATION_TIMEOUT_MS),
            mock_provider: false,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "BAKECHAT_PORT";
    const ENV_BIND_ADDR: &'static str = "BAKECHAT_BIND_ADDR";
    const ENV_QDRANT_URL: &'static str = "BAKECHAT_QDRANT_URL";
    const ENV_COLLECTION: &'static str = "BAKECHAT_COLLECTION";
    const ENV_EMBEDDER_PATH: &'static str = "BAKECHAT_EMBEDDER_PATH";
    const ENV_RERANKER_PATH: &'static str = "BAKECHAT_RERANKER_PATH";
    const ENV_GENERATOR_PATH: &'static str = "BAKECHAT_GENERATOR_PATH";
    const ENV_GENERATOR_MODEL: &'static str = "BAKECHAT_GENERATOR_MODEL";
    const ENV_MAX_NEW_TOKENS: &'static str = "BAKECHAT_MAX_NEW_TOKENS";
    const ENV_TOP_K: &'static str = "BAKECHAT_TOP_K";
    const ENV_GENERATION_TIMEOUT_MS: &'static str = "BAKECHAT_GENERATION_TIMEOUT_MS";
    const ENV_MOCK_PROVIDER: &'static str = "BAKECHAT_MOCK_PROVIDER";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let qdrant_url = Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url);
        let collection = Self::parse_string_from_env(Self::ENV_COLLECTION, defaults.collection);
        let embedder_path = Self::parse_optional_path_from_env(Self::ENV_EMBEDDER_PATH);
        let reranker_path = Self::parse_optional_path_from_env(Self::ENV_RERANKER_PATH);
        let generator_path = Self::parse_optional_path_from_env(Self::ENV_GENERATOR_PATH);
        let generator_model = Self::parse_optional_string_from_env(Self::ENV_GENERATOR_MODEL);
        let max_new_tokens =
            Self::parse_u64_from_env(Self::ENV_MAX_NEW_TOKENS, defaults.max_new_tokens as u64)
                as usize;
        let top_k = Self::parse_u64_from_env(Self::ENV_TOP_K, defaults.top_k);
        let generation_timeout = Duration::from_millis(Self::parse_u64_from_env(
            Self::ENV_GENERATION_TIMEOUT_MS,
            DEFAULT_GENERATION_TIMEOUT_MS,
        ));
        let mock_provider = env::var_os(Self::ENV_MOCK_PROVIDER).is_some_and(|v| !v.is_empty());

        Ok(Self {
            port,
            bind_addr,
            qdrant_url,
            collection,
            embedder_path,
            reranker_path,
            generator_path,
            generator_model,
            max_new_tokens,
            top_k,
            generation_timeout,
            mock_provider,
        })
    }

    /// Validates paths and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_COLLECTION,
            });
        }

        if self.max_new_tokens == 0 {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_MAX_NEW_TOKENS,
            });
        }

        if !(MIN_TOP_K..=MAX_TOP_K).contains(&self.top_k) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_TOP_K,
                value: self.top_k,
                min: MIN_TOP_K,
                max: MAX_TOP_K,
            });
        }

        if self.generation_timeout.is_zero() {
            return Err(ConfigError::ZeroValue {
                name: Self::ENV_GENERATION_TIMEOUT_MS,
            });
        }

        for path in [
            &self.embedder_path,
            &self.reranker_path,
            &self.generator_path,
        ]
        .into_iter()
        .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
