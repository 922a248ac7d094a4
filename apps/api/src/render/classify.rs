//! Line classification for model output.
//!
//! Each line is blank, a section header, a bullet or a plain paragraph. A
//! section cursor follows the most recent header so later lines know where
//! they sit. Nothing here can fail; unrecognised shapes are plain text.

/// Sections recognised by header vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Summary,
    Profile,
    Experience,
    Education,
    Skills,
    Certifications,
}

/// Header words, compared case-insensitively after markdown decoration and
/// a trailing colon are removed.
const SECTION_VOCABULARY: &[(&str, Section)] = &[
    ("summary", Section::Summary),
    ("professional summary", Section::Summary),
    ("profile", Section::Profile),
    ("professional profile", Section::Profile),
    ("experience", Section::Experience),
    ("work experience", Section::Experience),
    ("professional experience", Section::Experience),
    ("employment history", Section::Experience),
    ("education", Section::Education),
    ("skills", Section::Skills),
    ("technical skills", Section::Skills),
    ("key skills", Section::Skills),
    ("certifications", Section::Certifications),
    ("certificates", Section::Certifications),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Header(Section),
    Bullet,
    Plain,
}

/// One classified line, ready for a document writer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLine {
    pub kind: LineKind,
    /// Display text: trimmed, bullet marker and markdown decoration removed.
    pub text: String,
    /// Bold emphasis for quantified achievements.
    pub emphasized: bool,
    /// Section cursor at this line; `None` before the first header.
    pub section: Option<Section>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Bold experience lines that carry a number, percentage or amount.
    pub emphasize_metrics: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            emphasize_metrics: true,
        }
    }
}

/// Returns the section a header line names, if any.
///
/// Accepts `Skills`, `SKILLS:`, `Skills: Rust, SQL`, `## Experience` and
/// `**Education**`.
pub fn match_section(line: &str) -> Option<Section> {
    let cleaned = strip_decoration(line);
    let head = cleaned.split_once(':').map_or(cleaned, |(head, _)| head);
    let key = head.trim().trim_matches('*').trim().to_lowercase();
    SECTION_VOCABULARY
        .iter()
        .find(|(word, _)| *word == key)
        .map(|(_, section)| *section)
}

/// Strips a leading bullet marker, returning the item text.
///
/// `-` and `•` always count as markers; `*`, `–` and `·` only when followed by
/// whitespace, so `**bold**` stays a paragraph.
pub fn strip_bullet(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    let marker = chars.next()?;
    let rest = chars.as_str();
    match marker {
        '-' | '•' => Some(rest.trim()),
        '*' | '–' | '·' if rest.starts_with(char::is_whitespace) => Some(rest.trim()),
        _ => None,
    }
}

/// True when the text carries a quantity: a digit, `%` or a currency sign.
pub fn has_metric(text: &str) -> bool {
    text.chars()
        .any(|c| c.is_ascii_digit() || matches!(c, '%' | '$' | '€' | '£'))
}

/// Removes markdown heading marks and bold wrapping.
fn strip_decoration(line: &str) -> &str {
    line.trim()
        .trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim()
}

/// Classifies every line of the model output.
pub fn classify_lines(text: &str, options: &RenderOptions) -> Vec<RenderedLine> {
    let mut section: Option<Section> = None;
    let mut lines = Vec::new();

    for raw in text.lines() {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            lines.push(RenderedLine {
                kind: LineKind::Blank,
                text: String::new(),
                emphasized: false,
                section,
            });
            continue;
        }

        if let Some(item) = strip_bullet(trimmed) {
            lines.push(RenderedLine {
                kind: LineKind::Bullet,
                text: item.to_string(),
                emphasized: emphasize(item, section, options),
                section,
            });
            continue;
        }

        if let Some(found) = match_section(trimmed) {
            section = Some(found);
            lines.push(RenderedLine {
                kind: LineKind::Header(found),
                text: strip_decoration(trimmed).replace("**", ""),
                emphasized: true,
                section,
            });
            continue;
        }

        let text = trimmed.trim_start_matches('#').trim();
        lines.push(RenderedLine {
            kind: LineKind::Plain,
            text: text.to_string(),
            emphasized: emphasize(text, section, options),
            section,
        });
    }

    lines
}

fn emphasize(text: &str, section: Option<Section>, options: &RenderOptions) -> bool {
    options.emphasize_metrics && section == Some(Section::Experience) && has_metric(text)
}
