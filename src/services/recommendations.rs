use crate::{
    error::{AppError, AppResult},
    models::{CatalogFilter, HistoryItem, RecommendationItem, RecommendationResult},
    services::recommender::Recommender,
};

/// Upper bound on `k` for popular and personalized lookups
pub const MAX_RECOMMENDATIONS: usize = 100;
/// Upper bound on `k` for history lookups
pub const MAX_HISTORY: usize = 200;

const NOT_READY: &str = "Recommender not ready";

/// Query facade in front of the fitted engine.
///
/// Holds either a fitted [`Recommender`] or the reason fitting failed. Inputs
/// are validated here so the engine only ever sees bounded `k` and a real user_id.
pub struct RecommendationService {
    engine: Result<Recommender, String>,
}

impl RecommendationService {
    pub fn new(engine: Recommender) -> Self {
        Self { engine: Ok(engine) }
    }

    /// A service that answers every query with NotReady
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            engine: Err(reason.into()),
        }
    }

    /// Wraps the outcome of loading and fitting, keeping the failure reason
    pub fn from_load(result: AppResult<Recommender>) -> Self {
        match result {
            Ok(engine) => Self::new(engine),
            Err(e) => {
                tracing::error!(error = %e, "Recommender failed to load");
                Self::unavailable(e.to_string())
            }
        }
    }

    /// `Ok(())` once fitted, otherwise the startup failure reason
    pub fn readiness(&self) -> Result<(), &str> {
        match &self.engine {
            Ok(_) => Ok(()),
            Err(reason) if reason.is_empty() => Err(NOT_READY),
            Err(reason) => Err(reason.as_str()),
        }
    }

    fn engine(&self) -> AppResult<&Recommender> {
        self.engine.as_ref().map_err(|reason| {
            AppError::NotReady(if reason.is_empty() {
                NOT_READY.to_string()
            } else {
                reason.clone()
            })
        })
    }

    pub fn popular(&self, k: usize, filter: &CatalogFilter) -> AppResult<Vec<RecommendationItem>> {
        let engine = self.engine()?;
        validate_k(k, MAX_RECOMMENDATIONS)?;
        Ok(engine.recommend_popular(k, None, filter))
    }

    pub fn recommendations(
        &self,
        user_id: &str,
        k: usize,
        filter: &CatalogFilter,
    ) -> AppResult<RecommendationResult> {
        let engine = self.engine()?;
        validate_user_id(user_id)?;
        validate_k(k, MAX_RECOMMENDATIONS)?;
        Ok(engine.recommend_for_user(user_id, k, filter))
    }

    pub fn history(&self, user_id: &str, k: usize) -> AppResult<Vec<HistoryItem>> {
        let engine = self.engine()?;
        validate_user_id(user_id)?;
        validate_k(k, MAX_HISTORY)?;
        Ok(engine.get_user_history(user_id, k))
    }
}

fn validate_k(k: usize, max: usize) -> AppResult<()> {
    if (1..=max).contains(&k) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "k must be between 1 and {}, got {}",
            max, k
        )))
    }
}

fn validate_user_id(user_id: &str) -> AppResult<()> {
    if user_id.trim().is_empty() {
        return Err(AppError::InvalidInput("user_id must not be empty".to_string()));
    }
    Ok(())
}
