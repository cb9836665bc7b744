use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{CatalogFilter, HistoryItem, RecommendationItem},
};

use super::AppState;

const DEFAULT_K: usize = 10;
const DEFAULT_HISTORY_K: usize = 20;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub k: Option<usize>,
    pub content_type: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    #[serde(default)]
    pub user_id: String,
    pub k: Option<usize>,
    pub content_type: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub user_id: String,
    pub k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PopularResponse {
    pub k: usize,
    pub items: Vec<RecommendationItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub user_id: String,
    pub k: usize,
    pub fallback_used: bool,
    pub items: Vec<RecommendationItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub k: usize,
    pub items: Vec<HistoryItem>,
}

// Handlers

/// Liveness probe; does not depend on the model
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe; 503 with the startup failure reason until the model is fitted
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.service.readiness() {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(detail) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "detail": detail })),
        ),
    }
}

/// Most-watched items
pub async fn popular(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<PopularQuery>, QueryRejection>,
) -> AppResult<Json<PopularResponse>> {
    let Query(params) = query?;
    let k = params.k.unwrap_or(DEFAULT_K);
    let filter = CatalogFilter {
        content_type: params.content_type,
        genre: params.genre,
    };

    tracing::info!(
        request_id = %request_id,
        k,
        content_type = ?filter.content_type,
        genre = ?filter.genre,
        "Serving popular items"
    );

    let items = state.service.popular(k, &filter)?;
    Ok(Json(PopularResponse { k, items }))
}

/// Personalized recommendations with popularity fallback
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<RecommendationsQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationsResponse>> {
    let Query(params) = query?;
    let k = params.k.unwrap_or(DEFAULT_K);
    let filter = CatalogFilter {
        content_type: params.content_type,
        genre: params.genre,
    };

    let result = state
        .service
        .recommendations(&params.user_id, k, &filter)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %params.user_id,
        k,
        returned = result.items.len(),
        fallback_used = result.fallback_used,
        "Served recommendations"
    );

    Ok(Json(RecommendationsResponse {
        user_id: params.user_id,
        k,
        fallback_used: result.fallback_used,
        items: result.items,
    }))
}

/// Per-item watch history, most recent first
pub async fn history(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> AppResult<Json<HistoryResponse>> {
    let Query(params) = query?;
    let k = params.k.unwrap_or(DEFAULT_HISTORY_K);
    let items = state.service.history(&params.user_id, k)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %params.user_id,
        k,
        returned = items.len(),
        "Served history"
    );

    Ok(Json(HistoryResponse {
        user_id: params.user_id,
        k,
        items,
    }))
}
