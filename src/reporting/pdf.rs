//! Paginated PDF rendering with the built-in Helvetica fonts.
//!
//! Built-in PDF fonts only cover Latin-1, so every string is passed through
//! [`latin1_safe`] before it is laid out.

use crate::types::{AppError, Result};
use crate::workflows::Report;
use chrono::{DateTime, TimeZone};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use std::fmt::Display;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
/// Points to millimetres.
const PT: f32 = 0.3528;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.55;

const TITLE_SIZE: f32 = 16.0;
const META_SIZE: f32 = 10.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 11.0;

/// Replace everything outside printable Latin-1 with `?`. Tabs become spaces.
pub fn latin1_safe(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\r')
        .map(|c| match c {
            '\t' => ' ',
            '\n' => '\n',
            c if c.is_control() => '?',
            c if (c as u32) <= 0xFF => c,
            _ => '?',
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Title,
    Meta,
    Heading,
    Body,
}

impl Style {
    fn size(self) -> f32 {
        match self {
            Style::Title => TITLE_SIZE,
            Style::Meta => META_SIZE,
            Style::Heading => HEADING_SIZE,
            Style::Body => BODY_SIZE,
        }
    }

    fn centered(self) -> bool {
        matches!(self, Style::Title | Style::Meta)
    }

    /// Vertical space a line of this style takes, in millimetres.
    fn advance(self) -> f32 {
        match self {
            Style::Title | Style::Meta | Style::Heading => 10.0,
            Style::Body => 6.0,
        }
    }
}

/// One line of text placed on a page, `y` measured from the bottom edge.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub style: Style,
    pub x: f32,
    pub y: f32,
}

fn max_chars(style: Style) -> usize {
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    (usable / (style.size() * PT * GLYPH_WIDTH)) as usize
}

fn text_width(text: &str, style: Style) -> f32 {
    text.chars().count() as f32 * style.size() * PT * GLYPH_WIDTH
}

/// Greedy word wrap; words longer than a line are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..width).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        lines.push(line);
    }
    lines
}

/// The report as styled lines: title, generation time, then a heading and
/// wrapped body per section, with the error list last.
pub fn layout<Tz>(report: &Report, generated_at: &DateTime<Tz>) -> Vec<(Style, String)>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = vec![
        (
            Style::Title,
            latin1_safe(&format!("Reconnaissance Report: {}", report.target)),
        ),
        (
            Style::Meta,
            format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        ),
    ];

    let mut body = |heading: &str, text: &str| {
        lines.push((Style::Heading, latin1_safe(heading)));
        for line in wrap(&latin1_safe(text.trim_end()), max_chars(Style::Body)) {
            lines.push((Style::Body, line));
        }
    };

    for section in &report.sections {
        body(&section.title.replace('_', " "), &section.content);
    }
    let errors = if report.errors.is_empty() {
        "None".to_string()
    } else {
        report
            .errors
            .iter()
            .map(|e| format!("- {}", e))
            .collect::<Vec<_>>()
            .join("\n")
    };
    body("Errors", &errors);

    lines
}

/// Assign page and position to each line, starting a new page at the bottom margin.
pub fn paginate(lines: Vec<(Style, String)>) -> Vec<Vec<PlacedLine>> {
    let mut pages = vec![Vec::new()];
    let mut y = PAGE_HEIGHT - MARGIN;

    for (style, text) in lines {
        if style == Style::Heading {
            // Gap before each section
            y -= 4.0;
        }
        y -= style.advance();
        if y < MARGIN {
            pages.push(Vec::new());
            y = PAGE_HEIGHT - MARGIN - style.advance();
        }
        let x = if style.centered() {
            ((PAGE_WIDTH - text_width(&text, style)) / 2.0).max(MARGIN)
        } else {
            MARGIN
        };
        if let Some(page) = pages.last_mut() {
            page.push(PlacedLine { text, style, x, y });
        }
    }
    pages
}

fn pdf_error(e: impl Display) -> AppError {
    AppError::Internal(format!("PDF rendering failed: {}", e))
}

/// Render the report as PDF bytes.
pub fn render<Tz>(report: &Report, generated_at: &DateTime<Tz>) -> Result<Vec<u8>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let title = latin1_safe(&format!("Reconnaissance Report: {}", report.target));
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Report".to_string());
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    for (index, page) in paginate(layout(report, generated_at)).into_iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Report");
            doc.get_page(page_index).get_layer(layer_index)
        };
        for line in page {
            let font = font_for(line.style, &regular, &bold);
            layer.use_text(line.text, line.style.size(), Mm(line.x), Mm(line.y), font);
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

fn font_for<'a>(
    style: Style,
    regular: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
) -> &'a IndirectFontRef {
    match style {
        Style::Title | Style::Heading => bold,
        Style::Meta | Style::Body => regular,
    }
}
