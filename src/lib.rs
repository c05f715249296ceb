//! BakeChat library crate (used by the server binary and integration tests).
//!
//! Answers recipe questions from a vector index of recipes, with citations,
//! ingredient substitutions, and deterministic fallbacks when the language
//! model's output is rejected.
//!
//! # Public API Surface
//!
//! ## Pipeline
//! - [`AnswerEngine`], [`AnswerResponse`] - retrieve, select context, generate, validate
//! - [`AnswerOutcome`] - terminal state of one request (accepted, fallback, refusal)
//! - [`Intent`], [`ContextSelection`], [`PromptPlan`] - intermediate stages
//!
//! ## Retrieval
//! - [`RetrievalGateway`], [`CandidateDocument`], [`SourceRow`]
//! - [`QueryEncoder`], [`Reranker`] - query embedding and cross-encoder reranking
//! - [`QdrantClient`], [`VectorDbClient`] - recipe index access
//!
//! ## Generation
//! - [`TextGenerator`] - capability trait
//! - [`Generator`] - local causal LM, remote provider, or stub
//! - [`GenerationAdapter`] - decoding settings, timeout, normalization
//!
//! ## Server
//! - [`server::create_router`], [`AppState`]
//!
//! ## Test/Mock Support
//! [`MockVectorDbClient`] and [`MockGenerator`] are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod answer;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod generation;
pub mod retrieval;
pub mod server;
pub mod vectordb;

pub use answer::{
    AnswerEngine, AnswerError, AnswerOutcome, AnswerResponse, ContextSelection, Intent,
    PromptPlan, Synthesis,
};
pub use config::{Config, ConfigError};
pub use constants::clamp_top_k;
pub use embedding::{
    EmbeddingError, QueryEncoder, QueryEncoderConfig, Reranker, RerankerConfig, RerankerError,
};
pub use generation::{
    CancelFlag, CausalGenerator, GenerationAdapter, GenerationError, GenerationParams, Generator,
    GeneratorKind, RemoteGenerator, TextGenerator,
};
#[cfg(any(test, feature = "mock"))]
pub use generation::MockGenerator;
pub use retrieval::{CandidateDocument, RetrievalError, RetrievalGateway, SourceRow};
pub use server::{ApiError, AppState};
#[cfg(any(test, feature = "mock"))]
pub use vectordb::MockVectorDbClient;
pub use vectordb::{
    DEFAULT_COLLECTION_NAME, QdrantClient, RecipeHit, RecipePayload, VectorDbClient,
    VectorDbError,
};
