//! Axum route handler for standalone text extraction.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::extract::upload::UploadForm;
use crate::extract::{DocumentFormat, Extraction};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub filename: Option<String>,
    pub format: DocumentFormat,
    pub text: String,
    pub usable: bool,
}

impl ExtractResponse {
    fn new(filename: Option<String>, extraction: Extraction) -> Self {
        Self {
            filename,
            usable: extraction.is_usable(),
            format: extraction.format,
            text: extraction.text,
        }
    }
}

/// POST /api/v1/extract
///
/// Multipart field `file`. Returns the extracted text so callers can preview
/// what the model will see.
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let mut form = UploadForm::from_multipart(multipart).await?;
    let document = form.take_document("file")?;
    let extraction = state.extractor.extract(&document).await;
    Ok(Json(ExtractResponse::new(document.filename, extraction)))
}
