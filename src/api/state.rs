use std::sync::Arc;

use crate::services::{RecommendationService, Recommender};

/// Shared application state.
///
/// The fitted model is immutable, so handlers read it concurrently without locking.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
}

impl AppState {
    pub fn new(service: RecommendationService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// State backed by an already fitted recommender
    pub fn ready(engine: Recommender) -> Self {
        Self::new(RecommendationService::new(engine))
    }

    /// State whose every query reports `reason` as service unavailable
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(RecommendationService::unavailable(reason))
    }
}
