// sumtopic: summarize long documents and classify them into topics
pub mod analysis;
pub mod app;
pub mod config;
pub mod file_picker;
pub mod input_buffer;
pub mod keyboard;
pub mod logging;
pub mod models;
pub mod pdf_extraction;
pub mod screen_mode;
pub mod theme;
pub mod types;
pub mod ui_renderer;

pub use logging::debug_log;
