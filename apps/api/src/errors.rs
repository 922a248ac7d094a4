use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::llm_client::CompletionError;
use crate::render::RenderError;
use crate::tailoring::prompts::PromptError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Unsupported document: {0}")]
    Extraction(#[from] ExtractError),

    #[error("{0}")]
    Prompt(#[from] PromptError),

    #[error("Completion service error ({}): {0}", .0.tag())]
    Completion(#[from] CompletionError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Multipart(e) => (e.status(), "MALFORMED_UPLOAD", e.body_text()),
            AppError::Extraction(e) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_DOCUMENT", e.to_string())
            }
            AppError::Prompt(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_INPUT",
                e.to_string(),
            ),
            AppError::Completion(e) => {
                tracing::error!("Completion error ({}): {e}", e.tag());
                let (status, code) = match e {
                    CompletionError::RateLimited { .. } => {
                        (StatusCode::TOO_MANY_REQUESTS, "LLM_RATE_LIMITED")
                    }
                    CompletionError::Authentication { .. } => {
                        (StatusCode::BAD_GATEWAY, "LLM_AUTH_ERROR")
                    }
                    CompletionError::InvalidRequest { .. } => {
                        (StatusCode::BAD_GATEWAY, "LLM_INVALID_REQUEST")
                    }
                    CompletionError::Other { .. } => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
                };
                (status, code, self.to_string())
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The document could not be rendered".to_string(),
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
