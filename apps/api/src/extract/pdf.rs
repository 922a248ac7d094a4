use crate::extract::{DocumentFormat, ExtractError, TextDecoder};

/// PDF text layer extraction via `pdf-extract`.
///
/// Scanned PDFs without a text layer decode to an empty string, which the
/// pipeline treats as unusable.
pub struct PdfDecoder;

impl TextDecoder for PdfDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Corrupt {
            format: DocumentFormat::Pdf,
            message: e.to_string(),
        })
    }
}
