// Whole-document text extraction
use lopdf::Document;
use std::path::Path;
use std::time::Instant;

use super::lopdf_helper::{load_pdf_bytes, with_pdf};
use crate::types::Result;
use crate::{debug_error, debug_log, debug_timing};

/// Concatenated text of every page, in page order. Pages whose text cannot be
/// decoded contribute nothing; a document with no text layer yields "".
pub fn document_text(document: &Document) -> String {
    let mut text = String::new();
    for (page_num, _page_id) in document.get_pages() {
        match document.extract_text(&[page_num]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => debug_error!("page {}: text extraction failed: {}", page_num, e),
        }
    }
    text
}

pub fn extract_text_from_bytes(name: &str, bytes: &[u8]) -> Result<String> {
    let start = Instant::now();
    let document = load_pdf_bytes(name, bytes)?;
    if document.is_encrypted() {
        debug_log(format!("{} is encrypted; extracted text may be empty", name));
    }
    let text = document_text(&document);
    debug_log(format!(
        "Extracted {} chars from {} pages of {}",
        text.chars().count(),
        document.get_pages().len(),
        name
    ));
    debug_timing!("PDF extraction", start);
    Ok(text)
}

/// Text and page count of a PDF on disk.
#[derive(Debug, Clone)]
pub struct PdfText {
    pub pages: usize,
    pub text: String,
}

pub fn read_pdf(path: &Path) -> Result<PdfText> {
    with_pdf(path, |document| {
        Ok(PdfText {
            pages: document.get_pages().len(),
            text: document_text(document),
        })
    })
}
