// lopdf helper - Pure Rust PDF loading
use lopdf::Document;
use std::fs;
use std::path::Path;

use crate::types::{Result, SumTopicError};

/// PDF files start with `%PDF-`, possibly after a little leading junk.
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes
        .windows(5)
        .take(1024)
        .any(|window| window == b"%PDF-")
}

/// Parse an in-memory PDF.
pub fn load_pdf_bytes(name: &str, bytes: &[u8]) -> Result<Document> {
    if !is_pdf(bytes) {
        return Err(SumTopicError::NotPdf(name.to_string()));
    }
    Document::load_mem(bytes).map_err(|e| SumTopicError::Pdf(format!("{}: {}", name, e)))
}

/// Read and parse a PDF from disk.
pub fn load_pdf(path: &Path) -> Result<Document> {
    let bytes = fs::read(path)?;
    load_pdf_bytes(&path.display().to_string(), &bytes)
}

/// Execute an operation with a PDF document
pub fn with_pdf<F, R>(path: &Path, f: F) -> Result<R>
where
    F: FnOnce(&Document) -> Result<R>,
{
    let document = load_pdf(path)?;
    f(&document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_pdf_magic() {
        assert!(is_pdf(b"%PDF-1.7\n..."));
        assert!(is_pdf(b"\r\n%PDF-1.4"));
        assert!(!is_pdf(b"PK\x03\x04 zip archive"));
        assert!(!is_pdf(b""));
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let err = load_pdf_bytes("notes.txt", b"just some text").unwrap_err();
        assert!(matches!(err, SumTopicError::NotPdf(name) if name == "notes.txt"));
    }

    #[test]
    fn reports_corrupt_pdf() {
        let err = load_pdf_bytes("broken.pdf", b"%PDF-1.4\ngarbage without xref").unwrap_err();
        assert!(matches!(err, SumTopicError::Pdf(_)));
    }
}
