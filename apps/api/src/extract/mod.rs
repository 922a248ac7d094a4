//! Text extraction from uploaded résumés and job descriptions.
//!
//! Format detection is by filename suffix, with the `%PDF` magic prefix taking
//! precedence over any filename. Each binary format is decoded by a
//! `TextDecoder` chosen when the `Extractor` is built; builds without the
//! matching cargo feature get a decoder that only reports its absence.
//!
//! Extraction never fails outright: a decoder error degrades to a placeholder
//! diagnostic and the `Extraction` is flagged as not usable.

#[cfg(feature = "docx-text")]
pub mod docx;
pub mod handlers;
#[cfg(feature = "pdf-text")]
pub mod pdf;
pub mod text;
pub mod upload;

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// First four bytes of every PDF file.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Upload extensions accepted by the HTTP surface.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0} text extraction is not available in this build")]
    #[cfg_attr(all(feature = "pdf-text", feature = "docx-text"), allow(dead_code))]
    Unavailable(DocumentFormat),

    #[error("corrupt {format} document: {message}")]
    Corrupt {
        format: DocumentFormat,
        message: String,
    },

    #[error("unsupported file type '.{extension}' (expected one of: pdf, docx, txt)")]
    UnsupportedExtension { extension: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
}

impl DocumentFormat {
    /// Detects the format from the magic prefix first, then the filename suffix.
    pub fn detect(bytes: &[u8], filename: Option<&str>) -> Self {
        let lower = filename.unwrap_or_default().to_lowercase();
        if bytes.starts_with(PDF_MAGIC) || lower.ends_with(".pdf") {
            DocumentFormat::Pdf
        } else if lower.ends_with(".docx") {
            DocumentFormat::Docx
        } else {
            DocumentFormat::Text
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Text => "text",
        })
    }
}

/// Rejects filenames whose extension is outside `ALLOWED_EXTENSIONS`.
/// Names without an extension pass; detection then falls back to content.
pub fn validate_upload_name(filename: &str) -> Result<(), ExtractError> {
    let Some((_, extension)) = filename.rsplit_once('.') else {
        return Ok(());
    };
    let extension = extension.to_lowercase();
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ExtractError::UnsupportedExtension { extension })
    }
}

/// Raw upload as received. Lives only for the duration of one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: Option<String>,
    pub bytes: Bytes,
}

#[cfg(test)]
impl UploadedDocument {
    pub fn new(filename: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename,
            bytes: bytes.into(),
        }
    }
}

/// Best-effort text pulled from an upload.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub format: DocumentFormat,
    pub text: String,
    /// Set when `text` is a placeholder diagnostic rather than document content.
    pub degraded: bool,
}

impl Extraction {
    /// False for placeholders and whitespace-only text. The pipeline stops on either.
    pub fn is_usable(&self) -> bool {
        !self.degraded && !self.text.trim().is_empty()
    }

    fn placeholder(format: DocumentFormat, error: &ExtractError) -> Self {
        Self {
            format,
            text: format!("({error})"),
            degraded: true,
        }
    }
}

/// A decoder for one binary document format.
pub trait TextDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Stand-in for a decoder compiled out of this build.
#[cfg_attr(all(feature = "pdf-text", feature = "docx-text"), allow(dead_code))]
pub struct UnavailableDecoder(pub DocumentFormat);

impl TextDecoder for UnavailableDecoder {
    fn decode(&self, _bytes: &[u8]) -> Result<String, ExtractError> {
        Err(ExtractError::Unavailable(self.0))
    }
}

/// Routes uploads to the decoder for their detected format.
#[derive(Clone)]
pub struct Extractor {
    pdf: Arc<dyn TextDecoder>,
    docx: Arc<dyn TextDecoder>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Builds an extractor with every decoder this binary was compiled with.
    pub fn new() -> Self {
        #[cfg(feature = "pdf-text")]
        let pdf: Arc<dyn TextDecoder> = Arc::new(pdf::PdfDecoder);
        #[cfg(not(feature = "pdf-text"))]
        let pdf: Arc<dyn TextDecoder> = Arc::new(UnavailableDecoder(DocumentFormat::Pdf));

        #[cfg(feature = "docx-text")]
        let docx: Arc<dyn TextDecoder> = Arc::new(docx::DocxDecoder);
        #[cfg(not(feature = "docx-text"))]
        let docx: Arc<dyn TextDecoder> = Arc::new(UnavailableDecoder(DocumentFormat::Docx));

        Self::with_decoders(pdf, docx)
    }

    pub fn with_decoders(pdf: Arc<dyn TextDecoder>, docx: Arc<dyn TextDecoder>) -> Self {
        Self { pdf, docx }
    }

    /// Extracts text from an upload. Binary decoders run on the blocking pool;
    /// a decoder error or panic yields a degraded placeholder.
    pub async fn extract(&self, document: &UploadedDocument) -> Extraction {
        let format = DocumentFormat::detect(&document.bytes, document.filename.as_deref());
        let decoder = match format {
            DocumentFormat::Pdf => Arc::clone(&self.pdf),
            DocumentFormat::Docx => Arc::clone(&self.docx),
            DocumentFormat::Text => {
                return Extraction {
                    format,
                    text: text::decode_text(&document.bytes),
                    degraded: false,
                };
            }
        };

        let bytes = document.bytes.clone();
        let decoded = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .unwrap_or_else(|join_err| {
                Err(ExtractError::Corrupt {
                    format,
                    message: format!("decoder aborted: {join_err}"),
                })
            });

        match decoded {
            Ok(text) => {
                debug!("Extracted {} chars from {format} upload", text.len());
                Extraction {
                    format,
                    text,
                    degraded: false,
                }
            }
            Err(e) => {
                warn!(
                    "Extraction of {:?} degraded to placeholder: {e}",
                    document.filename.as_deref().unwrap_or("<unnamed>")
                );
                Extraction::placeholder(format, &e)
            }
        }
    }
}
