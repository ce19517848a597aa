// PDF extraction module
pub mod lopdf_helper;
pub mod text;

pub use lopdf_helper::{is_pdf, load_pdf_bytes};
pub use text::{extract_text_from_bytes, read_pdf, PdfText};
