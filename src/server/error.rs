use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::BAKECHAT_STATUS_HEADER;
use crate::answer::AnswerError;
use crate::generation::GenerationError;
use crate::retrieval::RetrievalError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AnswerError> for ApiError {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::Retrieval(e) => ApiError::Retrieval(e),
            AnswerError::Generation(e) => ApiError::Generation(e),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ApiError {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ApiError::Retrieval(_) => (StatusCode::SERVICE_UNAVAILABLE, "retrieval_error"),
            ApiError::Generation(_) => (StatusCode::BAD_GATEWAY, "generation_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, bakechat_status) = self.status();

        tracing::warn!(status = status.as_u16(), error = %self, "Request failed");

        let mut headers = HeaderMap::new();
        headers.insert(
            BAKECHAT_STATUS_HEADER,
            HeaderValue::from_static(bakechat_status),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
