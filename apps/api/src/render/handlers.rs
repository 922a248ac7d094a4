//! Axum route handler for document downloads.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::render::{ArtifactFormat, RenderOptions, RenderedDocument, ResumeDocument};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub text: String,
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub emphasize_metrics: Option<bool>,
}

impl IntoResponse for RenderedDocument {
    fn into_response(self) -> Response {
        let disposition = format!("attachment; filename=\"{}\"", self.file_name());
        (
            [
                (header::CONTENT_TYPE, self.content_type().to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}

/// POST /api/v1/render/:format
///
/// `format` is `docx`, `pdf` or `txt`. The body carries the tailored text and
/// optionally the candidate name used as the document title.
pub async fn handle_render(
    State(state): State<AppState>,
    Path(format): Path<String>,
    payload: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<RenderedDocument, AppError> {
    let format: ArtifactFormat = format
        .parse()
        .map_err(|e: crate::render::UnknownFormat| AppError::Validation(e.to_string()))?;
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    if request.text.trim().is_empty() {
        return Err(AppError::Validation(
            "Field 'text' must not be empty".to_string(),
        ));
    }

    let options = RenderOptions {
        emphasize_metrics: request.emphasize_metrics.unwrap_or(true),
    };
    let document =
        ResumeDocument::from_text(request.candidate_name.as_deref(), &request.text, &options);

    Ok(state.renderer.render(format, &document).await?)
}
