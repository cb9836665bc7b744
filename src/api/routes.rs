use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::ready))
        // Recommendations
        .route("/popular", get(handlers::popular))
        .route("/recommendations", get(handlers::recommendations))
        .route("/history", get(handlers::history))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(CorsLayer::permissive())
        // outermost, so the id exists before the trace span is created
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
