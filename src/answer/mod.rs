//! Grounded answer synthesis.
//!
//! One request runs: retrieve → lexical re-sort and render context → classify
//! intent → build prompt → generate → validate, falling back to curated or
//! extractive text when the generation is rejected.
//!
//! Every successful answer ends with a `Sources:` line. Errors are reserved for
//! broken dependencies (index or generator); see [`AnswerError`].

pub mod catalog;
pub mod context;
pub mod error;
pub mod intent;
pub mod prompt;
pub mod relevance;
pub mod validator;

pub use context::ContextSelection;
pub use error::AnswerError;
pub use intent::Intent;
pub use prompt::PromptPlan;
pub use validator::AnswerOutcome;

use tracing::{debug, info, instrument};

use crate::constants::CANDIDATE_LIMIT;
use crate::generation::{GenerationAdapter, TextGenerator};
use crate::retrieval::{CandidateDocument, RetrievalGateway, SourceRow};
use crate::vectordb::VectorDbClient;

/// Answer text plus the sources table shown next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerResponse {
    pub answer: String,
    /// Top candidates as `{id, title, ingredients}`, in retrieval order.
    pub sources: Vec<SourceRow>,
    pub outcome: AnswerOutcome,
}

/// Answer for a fixed candidate set.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub answer: String,
    pub outcome: AnswerOutcome,
}

pub struct AnswerEngine<V: VectorDbClient, G: TextGenerator> {
    gateway: RetrievalGateway<V>,
    generation: GenerationAdapter<G>,
}

impl<V: VectorDbClient, G: TextGenerator> AnswerEngine<V, G> {
    pub fn new(gateway: RetrievalGateway<V>, generation: GenerationAdapter<G>) -> Self {
        Self {
            gateway,
            generation,
        }
    }

    pub fn gateway(&self) -> &RetrievalGateway<V> {
        &self.gateway
    }

    pub fn generation(&self) -> &GenerationAdapter<G> {
        &self.generation
    }

    /// Retrieves, keeps the top five candidates, and synthesizes an answer.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn answer(
        &self,
        query: &str,
        top_k: u64,
        use_reranker: bool,
    ) -> Result<AnswerResponse, AnswerError> {
        let query = query.trim();

        let mut candidates = self.gateway.retrieve(query, top_k, use_reranker).await?;
        candidates.truncate(CANDIDATE_LIMIT);

        let sources = candidates.iter().map(CandidateDocument::source_row).collect();
        let Synthesis { answer, outcome } = self.synthesize(query, &candidates).await?;

        Ok(AnswerResponse {
            answer,
            sources,
            outcome,
        })
    }

    /// Runs everything after retrieval. Candidates are expected to be at most five.
    pub async fn synthesize(
        &self,
        query: &str,
        candidates: &[CandidateDocument],
    ) -> Result<Synthesis, AnswerError> {
        let query = query.trim();
        let query_lower = query.to_lowercase();

        let intent = intent::classify(query);
        let selection = context::select(query, candidates, intent.target());
        let citation_line = selection.citation_line();

        debug!(
            is_substitution = intent.is_substitution,
            target = intent.target().unwrap_or(""),
            rendered = selection.citations.len(),
            "Context selected"
        );

        let outcome = match prompt::build(query, &intent, &selection.context) {
            PromptPlan::NeedsClarification => AnswerOutcome::Clarification,
            PromptPlan::Substitution(prompt) => {
                let generated = self.generation.generate(&prompt).await?;
                validator::resolve_substitution(
                    &generated,
                    intent.target().unwrap_or_default(),
                    &query_lower,
                )
            }
            PromptPlan::General(prompt) => {
                let generated = self.generation.generate(&prompt).await?;
                if let Some(reason) = validator::general_rejection(&generated) {
                    debug!(reason, "Generated answer rejected");
                }
                validator::resolve_general(&generated, selection.top_record())
            }
        };

        info!(
            outcome = outcome.kind(),
            candidates = candidates.len(),
            "Answer synthesized"
        );

        Ok(Synthesis {
            answer: outcome.render(&citation_line),
            outcome,
        })
    }
}
