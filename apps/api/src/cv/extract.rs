//! Text extraction from uploaded resume files.
//!
//! PDFs go through `pdf-extract`; images are OCR'd with the `tesseract` CLI.
//! Both are blocking: callers run [`TextExtractor::extract`] on
//! `tokio::task::spawn_blocking`.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use thiserror::Error;

/// Extensions accepted by the upload endpoint, lowercase with leading dot.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".png", ".jpg", ".jpeg"];

const TESSERACT_BIN: &str = "tesseract";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Extraction backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("OCR failed: {0}")]
    Ocr(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = extension_of(path);
        match ext.as_str() {
            ".pdf" => Ok(DocumentKind::Pdf),
            ".png" | ".jpg" | ".jpeg" => Ok(DocumentKind::Image),
            _ => Err(ExtractError::UnsupportedFormat(ext)),
        }
    }
}

/// Lowercased extension with its leading dot, or `""` when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Produces raw text from a document on disk.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Default extractor: `pdf-extract` for PDFs, `tesseract` for images.
pub struct DocumentTextExtractor;

impl TextExtractor for DocumentTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        match DocumentKind::from_path(path)? {
            DocumentKind::Pdf => extract_pdf(path),
            DocumentKind::Image => extract_image(path),
        }
    }
}

fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
        path: path.display().to_string(),
        source,
    })?;
    pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| ExtractError::Pdf(format!("{}: {e}", path.display())))
}

fn extract_image(path: &Path) -> Result<String, ExtractError> {
    let output = Command::new(TESSERACT_BIN)
        .arg(path)
        .arg("stdout")
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => ExtractError::BackendUnavailable(format!(
                "`{TESSERACT_BIN}` not found on PATH; install Tesseract OCR for image uploads"
            )),
            _ => ExtractError::Ocr(e.to_string()),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractError::Ocr(format!(
            "{} exited with {}: {}",
            TESSERACT_BIN,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
