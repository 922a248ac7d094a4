// Document rendering: the model's reply becomes a DOCX, PDF or plain-text
// download. Lines are classified once and every writer consumes the same
// ResumeDocument. Nothing is written to disk except inside the LibreOffice
// backend's scratch directory.

pub mod classify;
pub mod convert;
pub mod docx;
pub mod font_metrics;
pub mod handlers;
pub mod pdf;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

pub use classify::{classify_lines, LineKind, RenderOptions, RenderedLine};
pub use convert::LibreOfficeBackend;
pub use pdf::NativePdfBackend;

use crate::tailoring::generator::FALLBACK_CANDIDATE_NAME;

/// Base name of every download.
pub const ARTIFACT_BASENAME: &str = "tailored_resume";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("DOCX encoding failed: {0}")]
    Docx(String),

    #[error("PDF encoding failed: {0}")]
    Pdf(String),

    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Output formats offered by the render endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Docx,
    Pdf,
    Text,
}

#[derive(Debug, Error)]
#[error("Unsupported render format '{0}'. Expected one of: docx, pdf, txt")]
pub struct UnknownFormat(pub String);

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Docx => "docx",
            ArtifactFormat::Pdf => "pdf",
            ArtifactFormat::Text => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ArtifactFormat::Pdf => "application/pdf",
            ArtifactFormat::Text => "text/plain; charset=utf-8",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{ARTIFACT_BASENAME}.{}", self.extension())
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArtifactFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docx" => Ok(ArtifactFormat::Docx),
            "pdf" => Ok(ArtifactFormat::Pdf),
            "txt" | "text" => Ok(ArtifactFormat::Text),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// The reply, classified and titled, ready for any writer.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeDocument {
    /// Rendered as the bold highlighted title.
    pub title: String,
    pub lines: Vec<RenderedLine>,
    /// Reply text exactly as received; the plain-text artifact.
    pub source_text: String,
}

impl ResumeDocument {
    /// Builds the document for `text`.
    ///
    /// With a candidate name, a leading reply line repeating it is dropped so
    /// the name is not printed twice. Without one, a leading plain line is
    /// promoted to the title, falling back to "Candidate Name".
    pub fn from_text(candidate_name: Option<&str>, text: &str, options: &RenderOptions) -> Self {
        let mut lines = classify_lines(text, options);
        let leading = lines
            .iter()
            .position(|line| line.kind != LineKind::Blank)
            .filter(|&i| lines[i].kind == LineKind::Plain);

        let title = match candidate_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => leading
                .map(|i| lines[i].text.clone())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| FALLBACK_CANDIDATE_NAME.to_string()),
        };

        if let Some(i) = leading {
            if lines[i].text.to_lowercase() == title.to_lowercase() {
                lines.drain(..=i);
            }
        }

        Self {
            title,
            lines,
            source_text: text.to_string(),
        }
    }
}

/// Finished download.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub format: ArtifactFormat,
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    pub fn file_name(&self) -> String {
        self.format.file_name()
    }
}

/// A way of turning a `ResumeDocument` into PDF bytes. One backend is
/// selected at startup.
#[async_trait]
pub trait PdfBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn render(&self, document: &ResumeDocument) -> Result<Vec<u8>, RenderError>;
}

/// Dispatches each artifact format to its writer.
#[derive(Clone)]
pub struct Renderer {
    pdf: Arc<dyn PdfBackend>,
}

impl Renderer {
    pub fn new(pdf: Arc<dyn PdfBackend>) -> Self {
        Self { pdf }
    }

    pub fn pdf_backend_name(&self) -> &'static str {
        self.pdf.name()
    }

    pub async fn render(
        &self,
        format: ArtifactFormat,
        document: &ResumeDocument,
    ) -> Result<RenderedDocument, RenderError> {
        let bytes = match format {
            ArtifactFormat::Docx => docx::render_docx(document)?,
            ArtifactFormat::Pdf => self.pdf.render(document).await?,
            ArtifactFormat::Text => document.source_text.clone().into_bytes(),
        };

        info!(
            format = %format,
            bytes = bytes.len(),
            pdf_backend = self.pdf.name(),
            "Rendered artifact"
        );

        Ok(RenderedDocument { format, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::classify::Section;

    fn doc(name: Option<&str>, text: &str) -> ResumeDocument {
        ResumeDocument::from_text(name, text, &RenderOptions::default())
    }

    #[test]
    fn test_format_parsing_and_file_names() {
        assert_eq!("docx".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::Docx);
        assert_eq!("PDF".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::Pdf);
        assert_eq!("txt".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::Text);
        assert!("odt".parse::<ArtifactFormat>().is_err());
        assert_eq!(ArtifactFormat::Pdf.file_name(), "tailored_resume.pdf");
        assert_eq!(ArtifactFormat::Text.content_type(), "text/plain; charset=utf-8");
    }

    #[test]
    fn test_repeated_name_line_is_dropped() {
        let d = doc(Some("Jane Doe"), "JANE DOE\nSKILLS:\n- Python");
        assert_eq!(d.title, "Jane Doe");
        assert_eq!(d.lines.len(), 2);
        assert_eq!(d.lines[0].kind, LineKind::Header(Section::Skills));
    }

    #[test]
    fn test_reply_without_name_line_is_kept_whole() {
        let d = doc(Some("Jane Doe"), "SUMMARY\nBuilds things");
        assert_eq!(d.title, "Jane Doe");
        assert_eq!(d.lines.len(), 2);
    }

    #[test]
    fn test_title_promoted_from_reply_when_no_name_given() {
        let d = doc(None, "\nJane Doe\nSKILLS:\n- Python\n- SQL");
        assert_eq!(d.title, "Jane Doe");
        assert_eq!(d.lines[0].kind, LineKind::Header(Section::Skills));
        assert_eq!(d.lines[1].kind, LineKind::Bullet);
    }

    #[test]
    fn test_fallback_title_when_reply_opens_with_header() {
        let d = doc(Some("   "), "EXPERIENCE\n- Shipped");
        assert_eq!(d.title, FALLBACK_CANDIDATE_NAME);
        assert_eq!(d.lines.len(), 2);
    }

    struct FixedPdf;

    #[async_trait]
    impl PdfBackend for FixedPdf {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn render(&self, _document: &ResumeDocument) -> Result<Vec<u8>, RenderError> {
            Ok(b"%PDF-fixed".to_vec())
        }
    }

    #[tokio::test]
    async fn test_renderer_dispatch() {
        let renderer = Renderer::new(Arc::new(FixedPdf));
        let d = doc(Some("Jane"), "Jane\nSkills\n- Rust");

        let text = renderer.render(ArtifactFormat::Text, &d).await.unwrap();
        assert_eq!(text.bytes, b"Jane\nSkills\n- Rust");

        let pdf = renderer.render(ArtifactFormat::Pdf, &d).await.unwrap();
        assert_eq!(pdf.bytes, b"%PDF-fixed");
        assert_eq!(pdf.content_type(), "application/pdf");

        let docx = renderer.render(ArtifactFormat::Docx, &d).await.unwrap();
        assert!(docx.bytes.starts_with(b"PK"));
        assert_eq!(renderer.pdf_backend_name(), "fixed");
    }
}
