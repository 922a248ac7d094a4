//! DOCX text extraction: reads `word/document.xml` out of the zip container
//! and flattens runs into lines, one per paragraph.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::extract::{DocumentFormat, ExtractError, TextDecoder};

const DOCUMENT_PART: &str = "word/document.xml";

/// Upper bound on the inflated size of `word/document.xml`. Real résumés sit
/// well under 1 MiB; anything past this is treated as a corrupt upload.
const MAX_DOCUMENT_XML_BYTES: u64 = 8 * 1024 * 1024;

pub struct DocxDecoder;

impl TextDecoder for DocxDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let xml = read_document_part(bytes, MAX_DOCUMENT_XML_BYTES)?;
        document_xml_text(&xml)
    }
}

/// Inflates the document part, refusing to go past `limit` bytes whether or
/// not the archive's declared size is honest.
fn read_document_part(bytes: &[u8], limit: u64) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| corrupt(format!("not a zip container: {e}")))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| corrupt(format!("missing {DOCUMENT_PART}: {e}")))?;

    if part.size() > limit {
        return Err(too_large(limit));
    }

    let mut xml = String::new();
    part.take(limit + 1)
        .read_to_string(&mut xml)
        .map_err(|e| corrupt(format!("unreadable {DOCUMENT_PART}: {e}")))?;
    if xml.len() as u64 > limit {
        return Err(too_large(limit));
    }
    Ok(xml)
}

fn too_large(limit: u64) -> ExtractError {
    corrupt(format!(
        "{DOCUMENT_PART} inflates past the {} KiB limit",
        limit / 1024
    ))
}

fn corrupt(message: String) -> ExtractError {
    ExtractError::Corrupt {
        format: DocumentFormat::Docx,
        message,
    }
}

/// Flattens WordprocessingML body text.
///
/// `w:t` content is appended verbatim, `w:tab` becomes a tab, `w:br`/`w:cr`
/// a line break, and each closed `w:p` ends a line. Tab stops declared inside
/// paragraph properties are ignored.
pub fn document_xml_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;
    let mut in_props = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text = true,
                b"w:pPr" => in_props = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:pPr" => in_props = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) if !in_props => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" | b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| corrupt(format!("bad text escape: {e}")))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(corrupt(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(out.trim_end().to_string())
}
