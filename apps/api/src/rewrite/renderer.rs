//! Document renderers for rewritten resumes.
//!
//! The rewrite pipeline only hands over ordered sections; how they are laid
//! out is the renderer's business. `PlainTextRenderer` is the shipped backend.

use anyhow::Result;

use crate::rewrite::ResumeSection;

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub content_type: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Carried in `AppState` as `Arc<dyn DocumentRenderer>`.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, title: &str, sections: &[ResumeSection]) -> Result<RenderedDocument>;
}

/// Renders sections as a UTF-8 text document with underlined headings.
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, title: &str, sections: &[ResumeSection]) -> Result<RenderedDocument> {
        let mut out = String::new();
        push_heading(&mut out, title, '=');

        for section in sections {
            out.push('\n');
            push_heading(&mut out, &section.title, '-');
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
        }

        Ok(RenderedDocument {
            content_type: "text/plain; charset=utf-8",
            file_name: "improved_resume.txt".to_string(),
            bytes: out.into_bytes(),
        })
    }
}

fn push_heading(out: &mut String, text: &str, underline: char) {
    out.push_str(text);
    out.push('\n');
    out.extend(std::iter::repeat(underline).take(text.chars().count()));
    out.push('\n');
}
