use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::BAKECHAT_STATUS_HEADER;
use super::error::ApiError;
use super::state::AppState;
use crate::constants::clamp_top_k;
use crate::generation::TextGenerator;
use crate::retrieval::SourceRow;
use crate::vectordb::VectorDbClient;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<u64>,
    #[serde(default)]
    pub use_reranker: bool,
}

#[derive(Debug, Serialize)]
pub struct AnswerPayload {
    pub id: String,
    pub created: i64,
    pub answer: String,
    pub sources: Vec<SourceRow>,
}

#[instrument(skip(state, request))]
pub async fn answer_handler<V, G>(
    State(state): State<AppState<V, G>>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, ApiError>
where
    V: VectorDbClient + 'static,
    G: TextGenerator + 'static,
{
    let request: AnswerRequest = serde_json::from_value(request)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    let top_k = clamp_top_k(request.top_k.unwrap_or(state.default_top_k));
    debug!(top_k, use_reranker = request.use_reranker, "Answer request");

    let response = state
        .engine
        .answer(&request.query, top_k, request.use_reranker)
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        BAKECHAT_STATUS_HEADER,
        HeaderValue::from_static(response.outcome.kind()),
    );

    let payload = AnswerPayload {
        id: format!("answer-{}", uuid::Uuid::new_v4()),
        created: chrono::Utc::now().timestamp(),
        answer: response.answer,
        sources: response.sources,
    };

    Ok((StatusCode::OK, headers, Json(payload)).into_response())
}
