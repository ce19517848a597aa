// Theme module - color scheme and styling
use crossterm::style::Color;

pub struct SumTopicTheme;

impl SumTopicTheme {
    pub fn bg_status_dark() -> Color {
        Color::Rgb { r: 40, g: 40, b: 46 }
    }

    pub fn text_status_dark() -> Color {
        Color::Rgb { r: 200, g: 200, b: 200 }
    }

    pub fn text_primary() -> Color {
        Color::Rgb { r: 248, g: 248, b: 242 }
    }

    pub fn text_secondary() -> Color {
        Color::Rgb { r: 180, g: 180, b: 180 }
    }

    pub fn text_dim() -> Color {
        Color::Rgb { r: 120, g: 120, b: 120 }
    }

    pub fn text_header() -> Color {
        Color::Black
    }

    pub fn accent_header() -> Color {
        Color::Rgb { r: 219, g: 112, b: 147 }  // Soft pink
    }

    pub fn accent_text() -> Color {
        Color::Rgb { r: 176, g: 196, b: 222 }  // Light steel blue
    }

    pub fn accent_debug() -> Color {
        Color::Rgb { r: 152, g: 195, b: 121 }
    }

    pub fn success() -> Color {
        Color::Rgb { r: 152, g: 195, b: 121 }  // Soft green
    }

    pub fn warning() -> Color {
        Color::Rgb { r: 255, g: 184, b: 108 }
    }

    pub fn error() -> Color {
        Color::Rgb { r: 255, g: 85, b: 85 }
    }

    pub fn gauge_empty() -> Color {
        Color::Rgb { r: 68, g: 71, b: 90 }
    }
}
