// Analysis pipeline - one user action in, one Outcome out
// Idle -> [Extracting] -> Validating -> Summarizing -> Classifying -> Displaying -> Idle
// Classification only ever sees the summary.

use serde::Serialize;
use std::borrow::Cow;
use std::time::Instant;

use super::policy::{length_budget, truncate_chars};
use super::validation::validate;
use crate::config::AppConfig;
use crate::models::{Summarizer, TopicClassifier};
use crate::pdf_extraction;
use crate::types::{
    word_count, Analysis, Outcome, ProcessingFailure, RawInput, Summary, TextStats,
};
use crate::{debug_error, debug_log, debug_timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    Extracting,
    Validating,
    Summarizing,
    Classifying,
    Displaying,
    Failed,
}

impl PipelineState {
    pub fn label(self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Extracting => "Extracting text from PDF...",
            PipelineState::Validating => "Checking input...",
            PipelineState::Summarizing => "Summarizing...",
            PipelineState::Classifying => "Classifying...",
            PipelineState::Displaying => "Done",
            PipelineState::Failed => "Failed",
        }
    }
}

pub struct Pipeline<'a> {
    summarizer: &'a dyn Summarizer,
    classifier: &'a dyn TopicClassifier,
    config: &'a AppConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        summarizer: &'a dyn Summarizer,
        classifier: &'a dyn TopicClassifier,
        config: &'a AppConfig,
    ) -> Self {
        Self { summarizer, classifier, config }
    }

    /// Text for `input`: pasted text as-is, PDFs through the extractor.
    pub fn extract<'i>(&self, input: &'i RawInput) -> Result<Cow<'i, str>, ProcessingFailure> {
        match input {
            RawInput::Text(text) => Ok(Cow::Borrowed(text.as_str())),
            RawInput::Pdf { name, bytes } => pdf_extraction::extract_text_from_bytes(name, bytes)
                .map(Cow::Owned)
                .map_err(|e| {
                    debug_error!("PDF extraction failed: {}", e);
                    ProcessingFailure::from_error(&anyhow::Error::new(e))
                }),
        }
    }

    pub fn run(&self, input: &RawInput, observe: &mut dyn FnMut(PipelineState)) -> Outcome {
        debug_log(format!("=== Analyzing {} ===", input.describe()));
        if matches!(input, RawInput::Pdf { .. }) {
            observe(PipelineState::Extracting);
        }
        match self.extract(input) {
            Ok(text) => self.analyze_text(&text, observe),
            Err(failure) => {
                observe(PipelineState::Failed);
                observe(PipelineState::Idle);
                Outcome::Failed(failure)
            }
        }
    }

    pub fn analyze_text(&self, text: &str, observe: &mut dyn FnMut(PipelineState)) -> Outcome {
        let start = Instant::now();
        let limits = &self.config.limits;

        observe(PipelineState::Validating);
        if let Err(warning) = validate(text, limits.min_words) {
            debug_log(format!("Input rejected: {:?}", warning));
            observe(PipelineState::Failed);
            observe(PipelineState::Idle);
            return Outcome::rejected(warning);
        }

        let truncated = truncate_chars(text, limits.max_chars);
        let was_truncated = truncated.len() < text.len();
        let budget = length_budget(word_count(truncated), &self.config.budget);
        debug_log(format!(
            "Input: {} words; truncated={}; budget=({}, {})",
            word_count(text),
            was_truncated,
            budget.min_length,
            budget.max_length
        ));

        observe(PipelineState::Summarizing);
        let summary = match self.summarizer.summarize(truncated, budget) {
            Ok(text) => Summary::new(text.trim()),
            Err(e) => return self.fail(e.context("summarization step"), observe),
        };
        debug_log(format!("Summary: {} words", summary.words));

        observe(PipelineState::Classifying);
        let topic = match self.classifier.classify(&summary.text) {
            Ok(topic) => topic,
            Err(e) => return self.fail(e.context("classification step"), observe),
        };

        observe(PipelineState::Displaying);
        debug_timing!("Analysis", start);
        observe(PipelineState::Idle);

        Outcome::Completed(Analysis {
            input: TextStats::of(text),
            truncated: was_truncated,
            budget,
            summary,
            topic,
            elapsed_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn fail(&self, err: anyhow::Error, observe: &mut dyn FnMut(PipelineState)) -> Outcome {
        debug_error!("{:#}", err);
        observe(PipelineState::Failed);
        observe(PipelineState::Idle);
        Outcome::Failed(ProcessingFailure::from_error(&err))
    }
}
