use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{ "error": "<message>" }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("AI service credits exhausted")]
    QuotaExhausted,

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited => AppError::RateLimited,
            LlmError::QuotaExhausted => AppError::QuotaExhausted,
            LlmError::Parse(_) | LlmError::EmptyContent => {
                AppError::MalformedResponse(err.to_string())
            }
            LlmError::Http(_) | LlmError::Api { .. } => AppError::Gateway(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded. Please try again in a moment.".to_string(),
            ),
            AppError::QuotaExhausted => (
                StatusCode::PAYMENT_REQUIRED,
                "AI service credits exhausted. Please contact support.".to_string(),
            ),
            AppError::Gateway(msg) => {
                tracing::error!("Gateway error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::MalformedResponse(msg) => {
                tracing::error!("Malformed AI response: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Invalid AI response format".to_string(),
                )
            }
            AppError::Persistence(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save analysis".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_errors_map_to_app_errors() {
        assert!(matches!(
            AppError::from(LlmError::RateLimited),
            AppError::RateLimited
        ));
        assert!(matches!(
            AppError::from(LlmError::QuotaExhausted),
            AppError::QuotaExhausted
        ));
        assert!(matches!(
            AppError::from(LlmError::EmptyContent),
            AppError::MalformedResponse(_)
        ));
        let api = LlmError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        match AppError::from(api) {
            AppError::Gateway(msg) => assert_eq!(msg, "AI gateway error: 500 boom"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (AppError::QuotaExhausted, StatusCode::PAYMENT_REQUIRED),
            (AppError::Gateway("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::MalformedResponse("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Persistence(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
