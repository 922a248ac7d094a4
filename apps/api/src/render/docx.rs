//! DOCX writer built on docx-rs.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, SpecialIndentType, Start,
};

use crate::render::{LineKind, RenderError, RenderedLine, ResumeDocument};

const BULLET_NUMBERING_ID: usize = 1;
const HIGHLIGHT: &str = "yellow";

// Run sizes are half-points.
const TITLE_SIZE: usize = 32;
const HEADER_SIZE: usize = 24;
const BODY_SIZE: usize = 21;

/// Encodes the document as a .docx archive.
pub fn render_docx(document: &ResumeDocument) -> Result<Vec<u8>, RenderError> {
    let mut docx = Docx::new()
        .add_abstract_numbering(bullet_definition())
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID))
        .add_paragraph(
            Paragraph::new().add_run(
                Run::new()
                    .add_text(document.title.as_str())
                    .bold()
                    .size(TITLE_SIZE)
                    .highlight(HIGHLIGHT),
            ),
        );

    for line in &document.lines {
        docx = docx.add_paragraph(paragraph_for(line));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| RenderError::Docx(e.to_string()))?;
    Ok(buffer.into_inner())
}

fn bullet_definition() -> AbstractNumbering {
    AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(
        Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )
        .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
    )
}

fn paragraph_for(line: &RenderedLine) -> Paragraph {
    match line.kind {
        LineKind::Blank => Paragraph::new(),
        LineKind::Header(_) => Paragraph::new().add_run(
            Run::new()
                .add_text(line.text.as_str())
                .bold()
                .size(HEADER_SIZE)
                .highlight(HIGHLIGHT),
        ),
        LineKind::Bullet => Paragraph::new()
            .add_run(body_run(line))
            .numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0)),
        LineKind::Plain => Paragraph::new().add_run(body_run(line)),
    }
}

fn body_run(line: &RenderedLine) -> Run {
    let run = Run::new().add_text(line.text.as_str()).size(BODY_SIZE);
    if line.emphasized {
        run.bold()
    } else {
        run
    }
}
