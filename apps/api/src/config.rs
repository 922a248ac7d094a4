use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Which backend turns a rendered résumé into PDF bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfRendererKind {
    /// In-process layout with printpdf built-in fonts.
    Native,
    /// DOCX rendered first, then converted by a headless LibreOffice.
    LibreOffice,
}

impl FromStr for PdfRendererKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(PdfRendererKind::Native),
            "libreoffice" | "soffice" => Ok(PdfRendererKind::LibreOffice),
            other => anyhow::bail!("unknown PDF renderer '{other}' (expected 'native' or 'libreoffice')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if `OPENAI_API_KEY` is missing or a numeric variable is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub default_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub request_timeout: Duration,
    pub pdf_renderer: PdfRendererKind,
    pub soffice_path: String,
    pub conversion_timeout: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string())
                .trim_end_matches('/')
                .to_string(),
            default_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            temperature: parse_env("LLM_TEMPERATURE", 0.2)?,
            max_tokens: parse_env("LLM_MAX_TOKENS", 1500)?,
            max_retries: parse_env("LLM_MAX_RETRIES", 3)?,
            backoff_base: Duration::from_millis(parse_env("LLM_BACKOFF_MS", 1000)?),
            request_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 120)?),
            pdf_renderer: parse_env("PDF_RENDERER", PdfRendererKind::Native)?,
            soffice_path: std::env::var("SOFFICE_PATH").unwrap_or_else(|_| "soffice".to_string()),
            conversion_timeout: Duration::from_secs(parse_env("CONVERT_TIMEOUT_SECS", 60)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    let value = std::env::var(key)
        .with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        anyhow::bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

/// Reads an optional variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}
