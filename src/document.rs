//! Document input: raw text or a file on disk.
//!
//! PDF files are decoded with `pdf-extract`, one string per page, pages
//! joined with `\n`. Any other file is read as UTF-8 text.

use std::path::{Path, PathBuf};

use crate::error::MatchError;

/// Where a project description or team roster comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    RawText(String),
    FilePath(PathBuf),
}

impl DocumentSource {
    /// Resolve the source to plain text.
    pub fn load_text(&self) -> Result<String, MatchError> {
        match self {
            DocumentSource::RawText(text) => Ok(text.clone()),
            DocumentSource::FilePath(path) if is_pdf(path) => read_pdf(path),
            DocumentSource::FilePath(path) => {
                std::fs::read_to_string(path).map_err(|e| document_error(path, e))
            }
        }
    }
}

impl From<&str> for DocumentSource {
    fn from(text: &str) -> Self {
        DocumentSource::RawText(text.to_string())
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn read_pdf(path: &Path) -> Result<String, MatchError> {
    let bytes = std::fs::read(path).map_err(|e| document_error(path, e))?;
    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| document_error(path, e))?;
    tracing::debug!(path = %path.display(), pages = pages.len(), "read PDF");
    Ok(pages.join("\n"))
}

fn document_error(path: &Path, err: impl std::fmt::Display) -> MatchError {
    MatchError::Document {
        path: path.display().to_string(),
        detail: err.to_string(),
    }
}
