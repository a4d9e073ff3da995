use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use merca_core::CoreError;
use merca_pricing::PricingError;
use merca_quote::QuoteError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => AppError::Validation(msg),
            CoreError::NotFound(msg) => AppError::NotFound(msg),
            CoreError::Forbidden(msg) => AppError::Forbidden(msg),
            CoreError::Conflict(msg) => AppError::Conflict(msg),
            CoreError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<QuoteError> for AppError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::NotFound(msg) => AppError::NotFound(msg),
            // A transition the state machine does not define conflicts
            // with the quote's current state.
            QuoteError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            QuoteError::Forbidden(msg) => AppError::Forbidden(msg),
            QuoteError::Validation(msg) => AppError::Validation(msg),
            QuoteError::Repository(inner) => inner.into(),
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
