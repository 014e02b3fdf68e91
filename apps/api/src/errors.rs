use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::curriculum::{CurriculumError, FailureKind};
use crate::extraction::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Generation exhausted: {0}")]
    GenerationExhausted(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::GenerationExhausted(_) | AppError::DeadlineExceeded(_)
        )
    }
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::EmptyInput(_) | ExtractError::UnsupportedFormat(_) => {
                AppError::Validation(e.to_string())
            }
            ExtractError::Unreadable(_) => AppError::UnprocessableEntity(e.to_string()),
        }
    }
}

impl From<CurriculumError> for AppError {
    fn from(e: CurriculumError) -> Self {
        let message = e.to_string();
        match e.kind {
            FailureKind::GenerationExhausted(_) => AppError::GenerationExhausted(message),
            FailureKind::DeadlineExceeded(_) => AppError::DeadlineExceeded(message),
            FailureKind::InvalidBrief(reason) => AppError::Validation(reason),
            FailureKind::InvalidTransition { .. } => AppError::Internal(anyhow::anyhow!(message)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retryable = self.is_retryable();
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::GenerationExhausted(msg) => {
                tracing::warn!("Generation exhausted: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "GENERATION_EXHAUSTED",
                    "Content generation is unavailable right now; try again shortly".to_string(),
                )
            }
            AppError::DeadlineExceeded(msg) => {
                tracing::warn!("Deadline exceeded: {msg}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "DEADLINE_EXCEEDED",
                    "The request took too long to complete".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "retryable": retryable
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::stage::PipelineStage;
    use std::time::Duration;

    #[test]
    fn test_curriculum_errors_map_to_status() {
        let deadline: AppError = CurriculumError {
            kind: FailureKind::DeadlineExceeded(Duration::from_secs(5)),
            stage: PipelineStage::Enriched,
        }
        .into();
        assert!(deadline.is_retryable());
        assert_eq!(deadline.into_response().status(), StatusCode::GATEWAY_TIMEOUT);

        let exhausted: AppError = CurriculumError {
            kind: FailureKind::GenerationExhausted("module".to_string()),
            stage: PipelineStage::Start,
        }
        .into();
        assert_eq!(exhausted.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let brief: AppError = CurriculumError {
            kind: FailureKind::InvalidBrief("project name is required".to_string()),
            stage: PipelineStage::Start,
        }
        .into();
        assert!(!brief.is_retryable());
        assert_eq!(brief.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_extract_errors_are_input_errors() {
        let err: AppError = ExtractError::EmptyInput("resume").into();
        assert!(matches!(err, AppError::Validation(_)));
        let err: AppError = ExtractError::Unreadable("bad pdf".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
