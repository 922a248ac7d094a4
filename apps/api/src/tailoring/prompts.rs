//! Prompt construction for résumé tailoring.

use thiserror::Error;

use crate::llm_client::prompts::{PRESERVE_FACTS_INSTRUCTION, RESUME_WRITER_SYSTEM};
use crate::llm_client::{ChatMessage, ChatRequest};
use crate::tailoring::tone::Tone;

/// Fixed instructions placed at the top of every tailoring prompt.
pub const TAILOR_INSTRUCTIONS: &str = "You are a professional résumé writer. \
    Tailor a résumé to a job description. \
    Use bullet points. \
    Include metrics when possible. \
    Mirror the keywords of the job description where the résumé supports them. \
    Use section headers such as Summary, Experience, Education, Skills and Certifications.";

#[derive(Debug, Error, PartialEq)]
pub enum PromptError {
    #[error("Could not extract any text from the résumé")]
    EmptyResume,

    #[error("Could not extract any text from the job description")]
    EmptyJobDescription,
}

/// Everything that goes into one tailoring prompt. Immutable once built.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    instructions: &'static str,
    resume_text: String,
    job_text: String,
    tone: Tone,
}

impl PromptRequest {
    pub fn new(
        resume_text: impl Into<String>,
        job_text: impl Into<String>,
        tone: Tone,
    ) -> Result<Self, PromptError> {
        let resume_text = resume_text.into();
        let job_text = job_text.into();
        if resume_text.trim().is_empty() {
            return Err(PromptError::EmptyResume);
        }
        if job_text.trim().is_empty() {
            return Err(PromptError::EmptyJobDescription);
        }
        Ok(Self {
            instructions: TAILOR_INSTRUCTIONS,
            resume_text,
            job_text,
            tone,
        })
    }

    /// Builds the prompt text. Résumé and job text are inserted verbatim apart
    /// from trimming.
    pub fn render(&self) -> String {
        format!(
            "{instructions}\n{preserve_facts}\n\n\
             RÉSUMÉ:\n{resume}\n\n\
             JOB DESCRIPTION:\n{job}\n\n\
             Tone: {tone}.\n\
             Style: {style}\n\
             Return only the tailored résumé.",
            instructions = self.instructions,
            preserve_facts = PRESERVE_FACTS_INSTRUCTION,
            resume = self.resume_text.trim(),
            job = self.job_text.trim(),
            tone = self.tone.label(),
            style = self.tone.style_guidance(),
        )
    }

    /// Wraps the rendered prompt in a system + user chat exchange.
    pub fn to_chat_request(&self, model: &str, temperature: f32, max_tokens: u32) -> ChatRequest {
        ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage::system(RESUME_WRITER_SYSTEM),
                ChatMessage::user(self.render()),
            ],
            temperature,
            max_tokens,
        }
    }
}
