use serde::Serialize;

use crate::vectordb::RecipeHit;

/// A recipe returned for one query; lives only for that request.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDocument {
    pub id: String,
    pub title: String,
    pub ingredients: String,
    pub steps: String,
    /// Inner product between query and recipe vectors.
    pub retrieval_score: f32,
    /// Cross-encoder score, present only when reranking ran.
    pub rerank_score: Option<f32>,
}

impl CandidateDocument {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        ingredients: impl Into<String>,
        steps: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ingredients: ingredients.into(),
            steps: steps.into(),
            retrieval_score: 0.0,
            rerank_score: None,
        }
    }

    pub fn with_retrieval_score(mut self, score: f32) -> Self {
        self.retrieval_score = score;
        self
    }

    /// Text scored by the cross-encoder.
    pub fn rerank_text(&self) -> String {
        format!("{}\n{}\n{}", self.title, self.ingredients, self.steps)
    }

    /// Projection shown to callers next to the answer.
    pub fn source_row(&self) -> SourceRow {
        SourceRow {
            id: self.id.clone(),
            title: self.title.clone(),
            ingredients: self.ingredients.clone(),
        }
    }
}

impl From<RecipeHit> for CandidateDocument {
    fn from(hit: RecipeHit) -> Self {
        Self {
            id: hit.recipe.recipe_id,
            title: hit.recipe.title,
            ingredients: hit.recipe.ingredients,
            steps: hit.recipe.steps,
            retrieval_score: hit.score,
            rerank_score: None,
        }
    }
}

/// `{id, title, ingredients}` row of the top-sources table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRow {
    pub id: String,
    pub title: String,
    pub ingredients: String,
}
