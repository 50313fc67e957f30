//! PDF backend for rewritten resumes: A4, Helvetica, a centred title on
//! every page, bold section headings, wrapped body text and a page footer.
//!
//! Placement is computed first (`layout`), then drawn with `printpdf`.

use anyhow::{anyhow, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::rewrite::renderer::{DocumentRenderer, RenderedDocument};
use crate::rewrite::ResumeSection;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const TOP_MARGIN: f32 = 20.0;
const BOTTOM_MARGIN: f32 = 20.0;
const FOOTER_Y: f32 = 10.0;

const TITLE_SIZE: f32 = 15.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 11.0;
const FOOTER_SIZE: f32 = 8.0;

const TITLE_ADVANCE: f32 = 15.0;
const HEADING_ADVANCE: f32 = 10.0;
const BODY_LINE: f32 = 5.0;
const SECTION_GAP: f32 = 5.0;

/// Helvetica at 11pt fits roughly this many average characters in 180mm.
const BODY_CHARS_PER_LINE: usize = 95;
const PT_TO_MM: f32 = 0.3528;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineStyle {
    Title,
    Heading,
    Body,
}

#[derive(Debug, Clone, PartialEq)]
struct PlacedLine {
    style: LineStyle,
    text: String,
    /// Baseline, in mm from the bottom edge.
    y: f32,
}

struct PageLayout<'a> {
    title: &'a str,
    pages: Vec<Vec<PlacedLine>>,
    y: f32,
}

impl<'a> PageLayout<'a> {
    fn new(title: &'a str) -> Self {
        let mut layout = Self {
            title,
            pages: Vec::new(),
            y: 0.0,
        };
        layout.new_page();
        layout
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.y = PAGE_HEIGHT - TOP_MARGIN;
        let title = self.title.to_string();
        self.place(LineStyle::Title, title, TITLE_ADVANCE);
    }

    fn place(&mut self, style: LineStyle, text: String, advance: f32) {
        if let Some(page) = self.pages.last_mut() {
            page.push(PlacedLine {
                style,
                text,
                y: self.y,
            });
        }
        self.y -= advance;
    }

    fn ensure(&mut self, needed: f32) {
        if self.y - needed < BOTTOM_MARGIN {
            self.new_page();
        }
    }
}

/// Places every line; a heading never ends a page without body text under it.
fn layout(title: &str, sections: &[ResumeSection]) -> Vec<Vec<PlacedLine>> {
    let mut layout = PageLayout::new(title);

    for section in sections {
        layout.ensure(HEADING_ADVANCE + BODY_LINE);
        layout.place(LineStyle::Heading, section.title.clone(), HEADING_ADVANCE);
        for line in &section.lines {
            for wrapped in wrap(line, BODY_CHARS_PER_LINE) {
                layout.ensure(BODY_LINE);
                layout.place(LineStyle::Body, wrapped, BODY_LINE);
            }
        }
        layout.y -= SECTION_GAP;
    }

    layout.pages
}

/// Greedy word wrap by character count. Words longer than a line are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

fn centered_x(text: &str, size_pt: f32) -> f32 {
    let width = text.chars().count() as f32 * size_pt * 0.5 * PT_TO_MM;
    ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
}

fn pdf_error(e: impl std::fmt::Debug) -> anyhow::Error {
    anyhow!("PDF rendering failed: {e:?}")
}

pub struct PdfRenderer;

impl DocumentRenderer for PdfRenderer {
    fn render(&self, title: &str, sections: &[ResumeSection]) -> Result<RenderedDocument> {
        let pages = layout(title, sections);

        let (doc, first_page, first_layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let italic = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(pdf_error)?;

        let mut targets = vec![(first_page, first_layer)];
        for _ in 1..pages.len() {
            targets.push(doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1"));
        }

        for (number, ((page, layer), lines)) in targets.into_iter().zip(&pages).enumerate() {
            let layer = doc.get_page(page).get_layer(layer);
            for line in lines {
                let (font, size, x) = match line.style {
                    LineStyle::Title => (&bold, TITLE_SIZE, centered_x(&line.text, TITLE_SIZE)),
                    LineStyle::Heading => (&bold, HEADING_SIZE, MARGIN),
                    LineStyle::Body => (&regular, BODY_SIZE, MARGIN),
                };
                layer.use_text(line.text.as_str(), size, Mm(x), Mm(line.y), font);
            }

            let footer = format!("Page {}", number + 1);
            layer.use_text(
                footer.as_str(),
                FOOTER_SIZE,
                Mm(centered_x(&footer, FOOTER_SIZE)),
                Mm(FOOTER_Y),
                &italic,
            );
        }

        Ok(RenderedDocument {
            content_type: "application/pdf",
            file_name: "improved_resume.pdf".to_string(),
            bytes: doc.save_to_bytes().map_err(pdf_error)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, lines: &[&str]) -> ResumeSection {
        ResumeSection {
            title: title.to_string(),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_wrap_respects_width_and_splits_long_words() {
        assert_eq!(
            wrap("Built payment APIs in Rust", 12),
            vec!["Built", "payment APIs", "in Rust"]
        );
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn test_layout_orders_title_heading_body() {
        let pages = layout(
            "Improved Resume",
            &[section("SKILLS", &["Rust, Go"]), section("EDUCATION", &["BSc"])],
        );

        assert_eq!(pages.len(), 1);
        let styles: Vec<_> = pages[0].iter().map(|l| l.style).collect();
        assert_eq!(
            styles,
            vec![
                LineStyle::Title,
                LineStyle::Heading,
                LineStyle::Body,
                LineStyle::Heading,
                LineStyle::Body
            ]
        );
        assert!(pages[0].windows(2).all(|w| w[0].y > w[1].y));
    }

    #[test]
    fn test_long_sections_flow_onto_new_pages_with_title() {
        let lines: Vec<String> = (0..120).map(|i| format!("Accomplishment {i}")).collect();
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        let pages = layout("Improved Resume", &[section("EXPERIENCE", &lines)]);

        assert!(pages.len() >= 3);
        for page in &pages {
            assert_eq!(page[0].style, LineStyle::Title);
            assert!(page.iter().all(|l| l.y >= BOTTOM_MARGIN));
        }
        let body_lines = pages
            .iter()
            .flatten()
            .filter(|l| l.style == LineStyle::Body)
            .count();
        assert_eq!(body_lines, 120);
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let doc = PdfRenderer
            .render(
                "Improved Resume",
                &[section("SUMMARY", &["Backend engineer who cut p99 latency by 40%"])],
            )
            .unwrap();

        assert_eq!(doc.content_type, "application/pdf");
        assert_eq!(doc.file_name, "improved_resume.pdf");
        assert!(doc.bytes.starts_with(b"%PDF"));
    }
}
