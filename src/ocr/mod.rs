//! Page extraction from source documents.
//!
//! The pipeline consumes a sequence of page texts and does not care how they
//! were produced. OCR quality and PDF rendering live entirely behind the
//! [`PageSource`] trait; the adapters here cover the two common local cases.

use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

/// Page separator emitted by pdftotext between PDF pages.
const FORM_FEED: char = '\u{c}';

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("page extraction tool failed: {0}")]
    Tool(String),
}

pub type Result<T> = std::result::Result<T, OcrError>;

/// Produces the ordered page texts of one source document.
pub trait PageSource {
    fn extract_pages(&self) -> Result<Vec<String>>;
}

/// Reads a plain-text file, treating form feeds as page breaks.
///
/// This matches the output convention of `pdftotext`, so a pre-extracted
/// dump can be fed straight in. A file without form feeds is one page.
pub struct TextFileSource {
    path: PathBuf,
}

impl TextFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PageSource for TextFileSource {
    fn extract_pages(&self) -> Result<Vec<String>> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(split_pages(&content))
    }
}

/// Extracts page texts by shelling out to `pdftotext`.
pub struct PdftotextSource {
    path: PathBuf,
}

impl PdftotextSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PageSource for PdftotextSource {
    fn extract_pages(&self) -> Result<Vec<String>> {
        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg(&self.path)
            .arg("-")
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Tool(format!(
                "pdftotext exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        let pages = split_pages(&text);
        log::info!("extracted {} pages from {}", pages.len(), self.path.display());
        Ok(pages)
    }
}

/// Split extracted text into pages on form feeds.
///
/// Interior blank pages are kept so that page numbering stays aligned with
/// the physical document; only trailing empty segments (pdftotext emits a
/// final form feed after the last page) are dropped.
fn split_pages(text: &str) -> Vec<String> {
    let mut pages: Vec<String> = text.split(FORM_FEED).map(|p| p.to_string()).collect();
    while pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}
