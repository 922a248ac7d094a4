//! Axum route handler for résumé tailoring.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::errors::AppError;
use crate::extract::upload::UploadForm;
use crate::state::AppState;
use crate::tailoring::generator::{tailor_resume, TailoredResume};
use crate::tailoring::tone::Tone;

/// POST /api/v1/resumes/tailor
///
/// Multipart fields: `resume` (file), `job_description` (file or text),
/// optional `tone` and `model`. Returns the tailored text; downloads are
/// produced by the render endpoints.
pub async fn handle_tailor(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TailoredResume>, AppError> {
    let mut form = UploadForm::from_multipart(multipart).await?;

    let tone = match form.text("tone") {
        Some(label) => label
            .parse::<Tone>()
            .map_err(|e| AppError::Validation(e.to_string()))?,
        None => Tone::default(),
    };
    let model = form.text("model");
    let resume_upload = form.take_document("resume")?;
    let job_upload = form.take_document("job_description")?;

    let (resume, job) = tokio::join!(
        state.extractor.extract(&resume_upload),
        state.extractor.extract(&job_upload)
    );

    let tailored = tailor_resume(
        state.llm.as_ref(),
        &state.completion,
        &resume,
        &job,
        tone,
        model,
    )
    .await?;

    Ok(Json(tailored))
}
