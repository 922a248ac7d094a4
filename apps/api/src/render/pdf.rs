//! Native PDF backend: printpdf with the built-in Helvetica faces.
//!
//! Layout is computed first as a list of pages of placed lines, then drawn.
//! All positions are in points; printpdf takes millimetres, converted at the
//! last moment.

use async_trait::async_trait;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use crate::render::font_metrics::{FontFace, FontMetricTable};
use crate::render::{LineKind, PdfBackend, RenderError, ResumeDocument};

// US letter, 1" margins.
const PAGE_WIDTH_PT: f32 = 612.0;
const PAGE_HEIGHT_PT: f32 = 792.0;
const MARGIN_PT: f32 = 72.0;

const TITLE_SIZE_PT: f32 = 16.0;
const HEADER_SIZE_PT: f32 = 12.0;
const BODY_SIZE_PT: f32 = 10.5;
const LEADING: f32 = 1.35;
const BULLET_INDENT_PT: f32 = 18.0;
const BULLET_MARKER: &str = "-";

const PT_TO_MM: f32 = 25.4 / 72.0;

#[derive(Debug, Clone, PartialEq)]
struct PlacedText {
    text: String,
    face: FontFace,
    size_pt: f32,
    x_pt: f32,
    y_pt: f32,
}

/// Lays out the document and encodes it.
pub fn render_pdf(document: &ResumeDocument) -> Result<Vec<u8>, RenderError> {
    let pages = layout(document);

    let (pdf, first_page, first_layer) = PdfDocument::new(
        document.title.as_str(),
        Mm(PAGE_WIDTH_PT * PT_TO_MM),
        Mm(PAGE_HEIGHT_PT * PT_TO_MM),
        "Layer 1",
    );
    let regular = builtin(&pdf, BuiltinFont::Helvetica)?;
    let bold = builtin(&pdf, BuiltinFont::HelveticaBold)?;

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            pdf.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = pdf.add_page(
                Mm(PAGE_WIDTH_PT * PT_TO_MM),
                Mm(PAGE_HEIGHT_PT * PT_TO_MM),
                format!("Layer {}", index + 1),
            );
            pdf.get_page(p).get_layer(l)
        };

        for placed in page {
            let font = match placed.face {
                FontFace::Regular => &regular,
                FontFace::Bold => &bold,
            };
            layer.use_text(
                placed.text.as_str(),
                placed.size_pt,
                Mm(placed.x_pt * PT_TO_MM),
                Mm(placed.y_pt * PT_TO_MM),
                font,
            );
        }
    }

    pdf.save_to_bytes()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

fn builtin(pdf: &PdfDocumentReference, font: BuiltinFont) -> Result<IndirectFontRef, RenderError> {
    pdf.add_builtin_font(font)
        .map_err(|e| RenderError::Pdf(e.to_string()))
}

/// Places every line, breaking pages when the bottom margin is reached.
/// Always returns at least one page.
fn layout(document: &ResumeDocument) -> Vec<Vec<PlacedText>> {
    let mut cursor = PageCursor::new();
    let text_width = PAGE_WIDTH_PT - 2.0 * MARGIN_PT;

    cursor.place_wrapped(
        &document.title,
        FontFace::Bold,
        TITLE_SIZE_PT,
        MARGIN_PT,
        text_width,
    );
    cursor.skip(BODY_SIZE_PT * 0.5);

    for line in &document.lines {
        match line.kind {
            LineKind::Blank => cursor.skip(BODY_SIZE_PT * 0.6),
            LineKind::Header(_) => {
                cursor.skip(HEADER_SIZE_PT * 0.4);
                // A header stays on the page of its first body line.
                cursor.keep_room((HEADER_SIZE_PT + BODY_SIZE_PT) * LEADING);
                cursor.place_wrapped(
                    &line.text,
                    FontFace::Bold,
                    HEADER_SIZE_PT,
                    MARGIN_PT,
                    text_width,
                );
            }
            LineKind::Bullet => {
                let face = face_for(line.emphasized);
                cursor.place_marker(BULLET_MARKER, BODY_SIZE_PT, MARGIN_PT + 6.0);
                cursor.place_wrapped(
                    &line.text,
                    face,
                    BODY_SIZE_PT,
                    MARGIN_PT + BULLET_INDENT_PT,
                    text_width - BULLET_INDENT_PT,
                );
            }
            LineKind::Plain => cursor.place_wrapped(
                &line.text,
                face_for(line.emphasized),
                BODY_SIZE_PT,
                MARGIN_PT,
                text_width,
            ),
        }
    }

    cursor.finish()
}

fn face_for(emphasized: bool) -> FontFace {
    if emphasized {
        FontFace::Bold
    } else {
        FontFace::Regular
    }
}

struct PageCursor {
    pages: Vec<Vec<PlacedText>>,
    current: Vec<PlacedText>,
    /// Top of the next line box.
    y_pt: f32,
    pending_marker: Option<(String, f32, f32)>,
}

impl PageCursor {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y_pt: PAGE_HEIGHT_PT - MARGIN_PT,
            pending_marker: None,
        }
    }

    fn skip(&mut self, amount_pt: f32) {
        // Vertical space at the top of a page is dropped.
        if !self.current.is_empty() {
            self.y_pt -= amount_pt;
        }
    }

    fn keep_room(&mut self, height_pt: f32) {
        if self.y_pt - height_pt < MARGIN_PT && !self.current.is_empty() {
            self.break_page();
        }
    }

    fn place_marker(&mut self, marker: &str, size_pt: f32, x_pt: f32) {
        self.pending_marker = Some((marker.to_string(), size_pt, x_pt));
    }

    fn place_wrapped(&mut self, text: &str, face: FontFace, size_pt: f32, x_pt: f32, width_pt: f32) {
        let table = FontMetricTable::for_face(face);
        let folded = fold_to_ascii(text);
        let line_height = size_pt * LEADING;

        for segment in table.wrap(&folded, width_pt / size_pt) {
            if self.y_pt - line_height < MARGIN_PT && !self.current.is_empty() {
                self.break_page();
            }
            let baseline = self.y_pt - size_pt;

            if let Some((marker, marker_size, marker_x)) = self.pending_marker.take() {
                self.current.push(PlacedText {
                    text: marker,
                    face: FontFace::Regular,
                    size_pt: marker_size,
                    x_pt: marker_x,
                    y_pt: baseline,
                });
            }

            self.current.push(PlacedText {
                text: segment,
                face,
                size_pt,
                x_pt,
                y_pt: baseline,
            });
            self.y_pt -= line_height;
        }
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y_pt = PAGE_HEIGHT_PT - MARGIN_PT;
    }

    fn finish(mut self) -> Vec<Vec<PlacedText>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Folds text into the printable ASCII range the built-in fonts encode.
/// Accented Latin letters lose their marks; typographic punctuation becomes
/// its ASCII form; anything else becomes `?`.
pub fn fold_to_ascii(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' => out.push(c),
            '\t' | '\u{a0}' | '\u{2002}'..='\u{200a}' => out.push(' '),
            '•' | '·' | '–' | '—' | '‐' | '‑' | '−' => out.push('-'),
            '‘' | '’' | '‚' | '′' => out.push('\''),
            '“' | '”' | '„' | '″' => out.push('"'),
            '…' => out.push_str("..."),
            '€' => out.push_str("EUR"),
            '£' => out.push_str("GBP"),
            'ß' => out.push_str("ss"),
            'Æ' => out.push_str("AE"),
            'æ' => out.push_str("ae"),
            'À'..='Å' => out.push('A'),
            'à'..='å' => out.push('a'),
            'Ç' => out.push('C'),
            'ç' => out.push('c'),
            'È'..='Ë' => out.push('E'),
            'è'..='ë' => out.push('e'),
            'Ì'..='Ï' => out.push('I'),
            'ì'..='ï' => out.push('i'),
            'Ñ' => out.push('N'),
            'ñ' => out.push('n'),
            'Ò'..='Ö' | 'Ø' => out.push('O'),
            'ò'..='ö' | 'ø' => out.push('o'),
            'Ù'..='Ü' => out.push('U'),
            'ù'..='ü' => out.push('u'),
            'Ý' => out.push('Y'),
            'ý' | 'ÿ' => out.push('y'),
            c if c.is_control() || c == '\u{200b}' || c == '\u{feff}' => {}
            _ => out.push('?'),
        }
    }
    out
}

/// printpdf with built-in Helvetica; needs no external tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePdfBackend;

#[async_trait]
impl PdfBackend for NativePdfBackend {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn render(&self, document: &ResumeDocument) -> Result<Vec<u8>, RenderError> {
        let document = document.clone();
        tokio::task::spawn_blocking(move || render_pdf(&document))
            .await
            .map_err(|e| RenderError::Pdf(format!("PDF task failed: {e}")))?
    }
}
