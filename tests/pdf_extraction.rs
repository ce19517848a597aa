// PDF text extraction against documents built in memory
mod common;

use common::pdf_with_pages;
use std::fs;
use sumtopic::pdf_extraction::{extract_text_from_bytes, is_pdf, read_pdf};
use sumtopic::types::SumTopicError;

#[test]
fn pages_are_concatenated_in_order() {
    let bytes = pdf_with_pages(&["First page text", "Second page text", "Third page text"]);
    assert!(is_pdf(&bytes));

    let text = extract_text_from_bytes("three.pdf", &bytes).unwrap();
    let first = text.find("First").unwrap();
    let second = text.find("Second").unwrap();
    let third = text.find("Third").unwrap();
    assert!(first < second && second < third, "{:?}", text);
}

#[test]
fn document_without_text_layer_yields_nothing() {
    let bytes = pdf_with_pages(&["", ""]);
    let text = extract_text_from_bytes("blank.pdf", &bytes).unwrap();
    assert!(text.trim().is_empty());
}

#[test]
fn non_pdf_bytes_are_rejected_by_name() {
    let err = extract_text_from_bytes("notes.txt", b"just some text").unwrap_err();
    assert!(matches!(err, SumTopicError::NotPdf(ref name) if name == "notes.txt"));
}

#[test]
fn read_pdf_reports_pages_and_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two.pdf");
    fs::write(&path, pdf_with_pages(&["alpha", "beta"])).unwrap();

    let pdf = read_pdf(&path).unwrap();
    assert_eq!(pdf.pages, 2);
    assert!(pdf.text.contains("alpha") && pdf.text.contains("beta"));

    let missing = dir.path().join("missing.pdf");
    assert!(matches!(read_pdf(&missing), Err(SumTopicError::Io(_))));
}
