use serde::Serialize;

/// Headers that start a new section. Matched against the uppercased line.
const SECTION_HEADERS: &[&str] = &[
    "CONTACT INFORMATION",
    "PROFESSIONAL SUMMARY",
    "SUMMARY",
    "WORK EXPERIENCE",
    "EMPLOYMENT HISTORY",
    "EXPERIENCE",
    "EDUCATION",
    "SKILLS",
    "CERTIFICATIONS",
    "PROJECTS",
    "AWARDS",
    "LANGUAGES",
    "INTERESTS",
];

/// Lines longer than this are content even if they open with a header word.
const MAX_HEADER_LEN: usize = 60;

const LEADING_SECTION: &str = "Header";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeSection {
    pub title: String,
    pub lines: Vec<String>,
}

/// Splits rewritten resume text into ordered sections.
///
/// Text before the first recognised header lands in "Header". Blank lines
/// are dropped, and so are sections that end up with no lines.
pub fn split_sections(text: &str) -> Vec<ResumeSection> {
    let mut sections = vec![ResumeSection {
        title: LEADING_SECTION.to_string(),
        lines: Vec::new(),
    }];

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match header_title(line) {
            Some(title) => sections.push(ResumeSection {
                title,
                lines: Vec::new(),
            }),
            None => {
                if let Some(current) = sections.last_mut() {
                    current.lines.push(line.to_string());
                }
            }
        }
    }

    sections.retain(|s| !s.lines.is_empty());
    sections
}

/// `Some(title)` when the line is a section header. Markdown heading and
/// bold markers are stripped; "Skills:" and "EXPERIENCE (2018 - 2024)" count,
/// "Experienced engineer" does not.
fn header_title(line: &str) -> Option<String> {
    let candidate = line
        .trim_start_matches('#')
        .trim()
        .trim_matches('*')
        .trim()
        .trim_end_matches(':')
        .trim();
    if candidate.is_empty() || candidate.chars().count() > MAX_HEADER_LEN {
        return None;
    }

    let upper = candidate.to_uppercase();
    SECTION_HEADERS.iter().find_map(|header| {
        let rest = upper.strip_prefix(header)?;
        match rest.chars().next() {
            None => Some(candidate.to_string()),
            Some(c) if !c.is_alphanumeric() => Some(candidate.to_string()),
            Some(_) => None,
        }
    })
}
