// Screen, input and result-tab modes for the TUI

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenMode {
    Main,   // Input + results
    Debug,  // Full screen debug output
}

impl ScreenMode {
    pub fn toggle(self) -> Self {
        match self {
            ScreenMode::Main => ScreenMode::Debug,
            ScreenMode::Debug => ScreenMode::Main,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    PasteText,
    UploadPdf,
}

impl InputMode {
    pub fn toggle(self) -> Self {
        match self {
            InputMode::PasteText => InputMode::UploadPdf,
            InputMode::UploadPdf => InputMode::PasteText,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputMode::PasteText => "Paste Text",
            InputMode::UploadPdf => "Upload PDF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultTab {
    Summary,
    Topic,
}

impl ResultTab {
    pub fn next(self) -> Self {
        match self {
            ResultTab::Summary => ResultTab::Topic,
            ResultTab::Topic => ResultTab::Summary,
        }
    }

    pub fn prev(self) -> Self {
        // Two tabs, so prev == next
        self.next()
    }

    pub fn title(self) -> &'static str {
        match self {
            ResultTab::Summary => "📄 Summary",
            ResultTab::Topic => "🏷 Topic Classification",
        }
    }
}
