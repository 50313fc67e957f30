//! Text source: turns an uploaded resume file into plain text.
//!
//! PDFs go through `pdf-extract`, DOCX through `zip` + `quick-xml` (see
//! `docx`), and `.txt` files are read as UTF-8 (lossy).
//! Extraction is blocking and CPU-bound, so async callers use
//! `extract_upload`, which runs it inside `spawn_blocking`.

use std::io::Write;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

mod docx;

pub use docx::extract_docx_text;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type '{0}'. Upload a PDF, DOCX or TXT resume.")]
    UnsupportedFormat(String),

    #[error("Could not read the uploaded file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not extract text from the PDF: {0}")]
    Pdf(String),

    #[error("Could not read the DOCX document: {0}")]
    Docx(String),

    #[error("The document contains no extractable text")]
    Empty,

    #[error("Text extraction task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Text,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractionError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "txt" => Ok(DocumentKind::Text),
            "" => Err(ExtractionError::UnsupportedFormat("(none)".to_string())),
            other => Err(ExtractionError::UnsupportedFormat(other.to_string())),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            DocumentKind::Pdf => ".pdf",
            DocumentKind::Docx => ".docx",
            DocumentKind::Text => ".txt",
        }
    }
}

/// Extracts text from a file on disk. Blank output counts as a failure.
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_file_name(&path.to_string_lossy())?;

    let text = match kind {
        DocumentKind::Pdf => {
            pdf_extract::extract_text(path).map_err(|e| ExtractionError::Pdf(e.to_string()))?
        }
        DocumentKind::Docx => extract_docx_text(std::fs::File::open(path)?)?,
        DocumentKind::Text => String::from_utf8_lossy(&std::fs::read(path)?).into_owned(),
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }
    debug!("Extracted {} chars from {}", text.len(), path.display());
    Ok(text)
}

/// Writes an upload to a temp file carrying its extension, then extracts it
/// off the async runtime. The temp file is removed when extraction finishes.
pub async fn extract_upload(file_name: &str, data: &[u8]) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_file_name(file_name)?;

    let mut file = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(kind.suffix())
        .tempfile()?;
    file.write_all(data)?;
    file.flush()?;

    info!("Extracting text from upload '{}' ({} bytes)", file_name, data.len());

    tokio::task::spawn_blocking(move || {
        let result = extract_text(file.path());
        drop(file);
        result
    })
    .await
    .map_err(|e| ExtractionError::Task(e.to_string()))?
}
