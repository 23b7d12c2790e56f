use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::llm_client::LlmError;
use crate::prompts::PromptError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Encoding(e) => AppError::Prompt(e),
            ExtractError::Unsupported(mime) => AppError::UnsupportedMediaType(mime),
            ExtractError::Pdf(msg) => {
                AppError::Validation(format!("could not read PDF content: {msg}"))
            }
            ExtractError::Docx(msg) => {
                AppError::Validation(format!("could not read DOCX content: {msg}"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Prompt(PromptError::MissingField { .. }) => (
                StatusCode::BAD_REQUEST,
                "MISSING_FIELD",
                self.to_string(),
            ),
            AppError::Prompt(PromptError::Encoding { .. }) => (
                StatusCode::BAD_REQUEST,
                "ENCODING_ERROR",
                self.to_string(),
            ),
            AppError::UnsupportedMediaType(mime) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                format!("Cannot extract text from '{mime}'"),
            ),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
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
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
