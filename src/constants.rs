//! Cross-cutting, shared constants.
//!
//! The answer pipeline is sensitive to every value here: changing a limit changes which
//! documents are rendered, which answers pass validation and what the fallback text looks like.

/// Candidates handed from retrieval to the answer pipeline.
pub const CANDIDATE_LIMIT: usize = 5;

/// Documents rendered into the prompt context (and cited).
pub const MAX_CONTEXT_DOCS: usize = 3;

/// Characters of step text kept per rendered context block.
pub const CONTEXT_STEPS_CHARS: usize = 300;

/// Characters of step text kept in the extractive fallback summary.
pub const FALLBACK_STEPS_CHARS: usize = 280;

/// Bonus added to a document's lexical score when it mentions the target ingredient.
pub const TARGET_BONUS: usize = 2;

/// Default generation budget.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 90;

/// Repetition penalty for decoder-only generators.
pub const CAUSAL_REPETITION_PENALTY: f32 = 1.2;

/// Repetition penalty for encoder-decoder (or whole-output) generators.
pub const SEQ2SEQ_REPETITION_PENALTY: f32 = 1.15;

/// General answers shorter than this (in characters) are rejected.
pub const MIN_ANSWER_CHARS: usize = 30;

/// Substitution answers need at least this many bullet lines.
pub const MIN_BULLETS: usize = 2;

/// Substitution answers (generated or catalog) carry at most this many bullets.
pub const MAX_BULLETS: usize = 4;

/// Default retrieval depth.
pub const DEFAULT_TOP_K: u64 = 20;

/// Lower bound accepted for a request's `top_k`.
pub const MIN_TOP_K: u64 = 5;

/// Upper bound accepted for a request's `top_k`.
pub const MAX_TOP_K: u64 = 50;

/// Output dimension of the default sentence encoder (all-MiniLM-L6-v2).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Token limit for encoder inputs.
pub const ENCODER_MAX_SEQ_LEN: usize = 256;

/// Token limit for cross-encoder (query, document) pairs.
pub const RERANKER_MAX_SEQ_LEN: usize = 512;

/// Clamps a caller-supplied `top_k` into the accepted range.
pub fn clamp_top_k(top_k: u64) -> u64 {
    top_k.clamp(MIN_TOP_K, MAX_TOP_K)
}
