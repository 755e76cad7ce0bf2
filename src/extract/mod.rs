//! Document text extraction, dispatched on file extension

pub mod docx;
pub mod pdf;

use std::path::Path;

use crate::error::Result;

/// Document formats the gateway can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Unsupported,
}

impl DocumentKind {
    pub fn from_filename(filename: &str) -> Self {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some("docx") => DocumentKind::Docx,
            _ => DocumentKind::Unsupported,
        }
    }
}

/// Extract plain text from an uploaded document.
///
/// Unsupported file types yield an empty string rather than an error, so the
/// caller reports them the same way as documents without any text.
pub fn extract_text(filename: &str, data: &[u8]) -> Result<String> {
    match DocumentKind::from_filename(filename) {
        DocumentKind::Pdf => pdf::extract_text(data),
        DocumentKind::Docx => docx::extract_text(data),
        DocumentKind::Unsupported => Ok(String::new()),
    }
}
