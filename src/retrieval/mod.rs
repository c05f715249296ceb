//! Retrieval gateway: query → vector search → optional cross-encoder rerank.
//!
//! The gateway returns candidates ordered by similarity, or by rerank score when the
//! caller asks for reranking. The answer pipeline applies its own lexical re-sort on top.

pub mod error;
pub mod model;


pub use error::RetrievalError;
pub use model::{CandidateDocument, SourceRow};

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::embedding::{QueryEncoder, Reranker, RerankerConfig, RerankerError};
use crate::vectordb::{VectorDbClient, VectorDbError};

pub struct RetrievalGateway<V: VectorDbClient> {
    encoder: Arc<QueryEncoder>,
    index: V,
    collection: String,
    reranker_config: RerankerConfig,
    reranker: OnceCell<Arc<Reranker>>,
}

impl<V: VectorDbClient> RetrievalGateway<V> {
    /// The reranker described by `reranker_config` is loaded on the first reranked request.
    pub fn new(
        encoder: Arc<QueryEncoder>,
        index: V,
        collection: impl Into<String>,
        reranker_config: RerankerConfig,
    ) -> Self {
        Self {
            encoder,
            index,
            collection: collection.into(),
            reranker_config,
            reranker: OnceCell::new(),
        }
    }

    /// Uses an already-loaded reranker instead of loading lazily.
    pub fn with_reranker(self, reranker: Reranker) -> Self {
        Self {
            reranker: OnceCell::new_with(Some(Arc::new(reranker))),
            ..self
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn encoder(&self) -> &QueryEncoder {
        &self.encoder
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    pub fn reranker_loaded(&self) -> bool {
        self.reranker.initialized()
    }

    /// Fails if the backing collection cannot be reached or does not exist.
    pub async fn ensure_ready(&self) -> Result<(), RetrievalError> {
        if !self.index.collection_exists(&self.collection).await? {
            return Err(VectorDbError::CollectionNotFound {
                collection: self.collection.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Returns up to `top_k` candidates for `query`.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: u64,
        use_reranker: bool,
    ) -> Result<Vec<CandidateDocument>, RetrievalError> {
        let vector = self.encoder.encode(query)?;
        let hits = self.index.search(&self.collection, vector, top_k).await?;

        let candidates: Vec<CandidateDocument> =
            hits.into_iter().map(CandidateDocument::from).collect();

        debug!(hits = candidates.len(), "Vector search complete");

        if !use_reranker || candidates.is_empty() {
            return Ok(candidates);
        }

        let reranker = self.reranker().await?;
        rerank_candidates(&reranker, query, candidates)
    }

    async fn reranker(&self) -> Result<Arc<Reranker>, RetrievalError> {
        let reranker = self
            .reranker
            .get_or_try_init(|| async {
                let config = self.reranker_config.clone();
                info!("Loading reranker on first use");
                let reranker = tokio::task::spawn_blocking(move || Reranker::load(config))
                    .await
                    .map_err(|e| RerankerError::ModelLoadFailed {
                        reason: format!("reranker load task failed: {}", e),
                    })??;
                Ok::<_, RetrievalError>(Arc::new(reranker))
            })
            .await?;
        Ok(Arc::clone(reranker))
    }
}

/// Re-sorts candidates by cross-encoder score (stable for equal scores).
pub fn rerank_candidates(
    reranker: &Reranker,
    query: &str,
    candidates: Vec<CandidateDocument>,
) -> Result<Vec<CandidateDocument>, RetrievalError> {
    let texts: Vec<String> = candidates.iter().map(CandidateDocument::rerank_text).collect();
    let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

    let ranked = reranker.rerank(query, &text_refs)?;

    let mut slots: Vec<Option<CandidateDocument>> = candidates.into_iter().map(Some).collect();
    let reordered = ranked
        .into_iter()
        .filter_map(|(idx, score)| {
            slots.get_mut(idx).and_then(Option::take).map(|mut doc| {
                doc.rerank_score = Some(score);
                doc
            })
        })
        .collect();

    Ok(reordered)
}
