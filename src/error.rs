use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("[{relation}] Missing required columns: {missing:?}. Found columns: {found:?}.")]
    Schema {
        relation: String,
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("{0}")]
    NotReady(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotReady(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Schema { .. } | AppError::Csv(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_missing_and_found_columns() {
        let err = AppError::Schema {
            relation: "events.csv".to_string(),
            missing: vec!["timestamp".to_string()],
            found: vec!["user_id".to_string(), "item_id".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("events.csv"));
        assert!(msg.contains("\"timestamp\""));
        assert!(msg.contains("\"user_id\""));
    }

    #[test]
    fn test_status_codes() {
        let not_ready = AppError::NotReady("Recommender not ready".to_string()).into_response();
        assert_eq!(not_ready.status(), StatusCode::SERVICE_UNAVAILABLE);

        let invalid = AppError::InvalidInput("k must be >= 1".to_string()).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }
}
