use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{ScoredPoint, Value};
use serde::{Deserialize, Serialize};

use super::VectorDbError;

/// Recipe metadata stored alongside each vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipePayload {
    pub recipe_id: String,
    pub title: String,
    pub ingredients: String,
    pub steps: String,
}

impl RecipePayload {
    pub fn new(
        recipe_id: impl Into<String>,
        title: impl Into<String>,
        ingredients: impl Into<String>,
        steps: impl Into<String>,
    ) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            title: title.into(),
            ingredients: ingredients.into(),
            steps: steps.into(),
        }
    }
}

/// One search result: similarity (inner product) plus the recipe payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeHit {
    pub score: f32,
    pub recipe: RecipePayload,
}

impl RecipeHit {
    pub fn new(score: f32, recipe: RecipePayload) -> Self {
        Self { score, recipe }
    }

    /// Converts a Qdrant point, rejecting payloads without the required fields.
    ///
    /// A field stored as `null` reads as empty text; a field that is absent is an error.
    pub fn from_scored_point(point: ScoredPoint) -> Result<Self, VectorDbError> {
        let point_label = match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Num(n)) => n.to_string(),
            Some(PointIdOptions::Uuid(u)) => u,
            None => "?".to_string(),
        };

        let payload = point.payload;
        let field = |name: &'static str| payload_text(&payload, name, &point_label);

        let recipe = RecipePayload {
            recipe_id: field("recipe_id")?,
            title: field("title")?,
            ingredients: field("ingredients")?,
            steps: field("steps")?,
        };

        Ok(Self {
            score: point.score,
            recipe,
        })
    }
}

fn payload_text(
    payload: &HashMap<String, Value>,
    name: &'static str,
    point: &str,
) -> Result<String, VectorDbError> {
    let malformed = || VectorDbError::MalformedRecord {
        point: point.to_string(),
        field: name,
    };

    let value = payload.get(name).ok_or_else(malformed)?;
    match &value.kind {
        Some(Kind::StringValue(s)) => Ok(s.clone()),
        Some(Kind::IntegerValue(i)) => Ok(i.to_string()),
        Some(Kind::DoubleValue(d)) => Ok(d.to_string()),
        Some(Kind::NullValue(_)) => Ok(String::new()),
        _ => Err(malformed()),
    }
}
