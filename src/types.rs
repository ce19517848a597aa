// Core types for sumtopic
use serde::Serialize;

/// Message shown when a run fails inside extraction or a model call.
pub const PROCESSING_ERROR_MESSAGE: &str = "An error occurred during processing.";

// What the user handed us for one analysis
#[derive(Debug, Clone)]
pub enum RawInput {
    Text(String),
    Pdf { name: String, bytes: Vec<u8> },
}

impl RawInput {
    pub fn describe(&self) -> String {
        match self {
            RawInput::Text(text) => format!("pasted text ({} bytes)", text.len()),
            RawInput::Pdf { name, bytes } => format!("PDF '{}' ({} bytes)", name, bytes.len()),
        }
    }
}

/// Word and character counters shown above the action button.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub words: usize,
    pub chars: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            words: word_count(text),
            chars: text.chars().count(),
        }
    }
}

/// Whitespace-delimited word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// (min_length, max_length) handed to the summarizer
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct LengthBudget {
    pub min_length: usize,
    pub max_length: usize,
}

impl LengthBudget {
    pub const fn new(min_length: usize, max_length: usize) -> Self {
        Self { min_length, max_length }
    }
}

impl From<(usize, usize)> for LengthBudget {
    fn from((min_length, max_length): (usize, usize)) -> Self {
        Self { min_length, max_length }
    }
}

impl From<LengthBudget> for (usize, usize) {
    fn from(budget: LengthBudget) -> (usize, usize) {
        (budget.min_length, budget.max_length)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub text: String,
    pub words: usize,
}

impl Summary {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let words = word_count(&text);
        Self { text, words }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicPrediction {
    pub label: String,
    pub score: f32,
}

impl TopicPrediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self { label: label.into(), score }
    }

    /// Score as a fill fraction for the confidence gauge, always within [0, 1].
    pub fn gauge_fraction(&self) -> f32 {
        if self.score.is_nan() {
            return 0.0;
        }
        self.score.clamp(0.0, 1.0)
    }

    pub fn score_caption(&self) -> String {
        format!("Confidence Score: {:.2}", self.score)
    }
}

/// Everything one successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub input: TextStats,
    pub truncated: bool,
    pub budget: LengthBudget,
    pub summary: Summary,
    pub topic: TopicPrediction,
    pub elapsed_ms: u64,
}

// User-input problems: shown as warnings, never raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationWarning {
    Empty,
    TooShort { words: usize, required: usize },
}

impl ValidationWarning {
    pub fn message(&self) -> String {
        match self {
            ValidationWarning::Empty => "Please provide some text or upload a PDF.".to_string(),
            ValidationWarning::TooShort { required, .. } => {
                format!("Please provide at least {} words.", required)
            }
        }
    }
}

/// Generic user-facing message plus the raw error text for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingFailure {
    pub message: String,
    pub detail: String,
}

impl ProcessingFailure {
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self {
            message: PROCESSING_ERROR_MESSAGE.to_string(),
            detail: format!("{:#}", err),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Completed(Analysis),
    Rejected { warning: ValidationWarning, message: String },
    Failed(ProcessingFailure),
}

impl Outcome {
    pub fn rejected(warning: ValidationWarning) -> Self {
        Outcome::Rejected { message: warning.message(), warning }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }
}

// App state flags using bitflags
bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AppFlags: u8 {
        const REDRAW    = 0b0001;
        const EXIT      = 0b0010;
        const BUSY      = 0b0100;
        const PICKING   = 0b1000;
    }
}

// Error types
#[derive(Debug, thiserror::Error)]
pub enum SumTopicError {
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("'{0}' is not a PDF file")]
    NotPdf(String),

    #[error("failed to load {model} model: {reason}")]
    ModelLoad { model: &'static str, reason: String },

    #[error("summarization failed: {0}")]
    Summarization(String),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SumTopicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gauge_is_clamped() {
        assert_eq!(TopicPrediction::new("sports", 1.0000002).gauge_fraction(), 1.0);
        assert_eq!(TopicPrediction::new("sports", -0.1).gauge_fraction(), 0.0);
        assert_eq!(TopicPrediction::new("sports", f32::NAN).gauge_fraction(), 0.0);
        assert_eq!(TopicPrediction::new("sports", 0.42).gauge_fraction(), 0.42);
    }

    #[test]
    fn caption_uses_two_decimals() {
        let prediction = TopicPrediction::new("news_&_social_concern", 0.8765);
        assert_eq!(prediction.score_caption(), "Confidence Score: 0.88");
    }

    #[test]
    fn stats_count_chars_not_bytes() {
        let stats = TextStats::of("héllo  wörld\n");
        assert_eq!(stats.words, 2);
        assert_eq!(stats.chars, 13);
    }

    #[test]
    fn warning_messages() {
        assert_eq!(
            ValidationWarning::Empty.message(),
            "Please provide some text or upload a PDF."
        );
        assert_eq!(
            ValidationWarning::TooShort { words: 12, required: 50 }.message(),
            "Please provide at least 50 words."
        );
    }

    #[test]
    fn summary_counts_words() {
        let summary = Summary::new("A short summary of things.");
        assert_eq!(summary.words, 5);
    }
}
