//! Résumé tailoring: orchestrates one pass of the pipeline.
//!
//! Flow: usable-text check → PromptRequest → chat request → completion service
//! → TailoredResume. Nothing is persisted; the caller renders the result.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::extract::Extraction;
use crate::llm_client::CompletionService;
use crate::tailoring::prompts::{PromptError, PromptRequest};
use crate::tailoring::tone::Tone;

/// Used when the résumé has no non-blank line to take a name from.
pub const FALLBACK_CANDIDATE_NAME: &str = "Candidate Name";

/// Per-call completion parameters, taken from `Config` at startup.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&Config> for CompletionSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.default_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Result of a successful tailoring run.
#[derive(Debug, Clone, Serialize)]
pub struct TailoredResume {
    pub request_id: Uuid,
    pub candidate_name: String,
    pub tone: Tone,
    pub model: String,
    pub tailored_text: String,
    pub generated_at: DateTime<Utc>,
}

/// The first non-blank line of the source résumé, which by convention is the name.
pub fn candidate_name(resume_text: &str) -> String {
    resume_text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(FALLBACK_CANDIDATE_NAME)
        .to_string()
}

/// Runs the tailoring pipeline.
///
/// Halts with `PromptError` before any completion call when either extraction
/// is unusable (empty, whitespace-only or a placeholder diagnostic).
pub async fn tailor_resume(
    llm: &dyn CompletionService,
    settings: &CompletionSettings,
    resume: &Extraction,
    job: &Extraction,
    tone: Tone,
    model_override: Option<String>,
) -> Result<TailoredResume, AppError> {
    if !resume.is_usable() {
        return Err(PromptError::EmptyResume.into());
    }
    if !job.is_usable() {
        return Err(PromptError::EmptyJobDescription.into());
    }

    let request_id = Uuid::new_v4();
    let model = model_override.unwrap_or_else(|| settings.model.clone());
    let prompt = PromptRequest::new(resume.text.as_str(), job.text.as_str(), tone)?;
    let chat = prompt.to_chat_request(&model, settings.temperature, settings.max_tokens);

    info!(
        %request_id,
        "Tailoring résumé ({} chars) against job description ({} chars), tone={}, model={}",
        resume.text.len(),
        job.text.len(),
        tone,
        model
    );

    let tailored_text = llm.complete(&chat).await?;

    info!(%request_id, "Tailored résumé generated ({} chars)", tailored_text.len());

    Ok(TailoredResume {
        request_id,
        candidate_name: candidate_name(&resume.text),
        tone,
        model,
        tailored_text,
        generated_at: Utc::now(),
    })
}
