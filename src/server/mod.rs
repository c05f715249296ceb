//! HTTP surface (Axum): health, readiness, and the answer endpoint.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use handler::{AnswerPayload, AnswerRequest, answer_handler};
pub use state::AppState;

use crate::generation::TextGenerator;
use crate::vectordb::VectorDbClient;

pub const BAKECHAT_STATUS_HEADER: &str = "X-BakeChat-Status";
pub const BAKECHAT_STATUS_HEALTHY: &str = "healthy";
pub const BAKECHAT_STATUS_READY: &str = "ready";

pub fn create_router<V, G>(state: AppState<V, G>) -> Router
where
    V: VectorDbClient + 'static,
    G: TextGenerator + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<V, G>))
        .route("/v1/answer", post(answer_handler::<V, G>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub vectordb: &'static str,
    pub encoder_mode: &'static str,
    pub reranker: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        BAKECHAT_STATUS_HEADER,
        HeaderValue::from_static(BAKECHAT_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

/// Ready once the recipe collection is reachable.
#[tracing::instrument(skip(state))]
pub async fn ready_handler<V, G>(State(state): State<AppState<V, G>>) -> Response
where
    V: VectorDbClient + 'static,
    G: TextGenerator + 'static,
{
    let gateway = state.engine.gateway();

    let vectordb = match gateway.ensure_ready().await {
        Ok(()) => BAKECHAT_STATUS_READY,
        Err(e) => {
            tracing::warn!(error = %e, "Recipe index not ready");
            "unavailable"
        }
    };

    let components = ComponentStatus {
        vectordb,
        encoder_mode: if gateway.encoder().is_stub() { "stub" } else { "real" },
        reranker: if gateway.reranker_loaded() { "loaded" } else { "lazy" },
    };

    let is_ready = components.vectordb == BAKECHAT_STATUS_READY;
    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "pending")
    };

    let mut headers = HeaderMap::new();
    headers.insert(BAKECHAT_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
