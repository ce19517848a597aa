// Process-wide model handles: loaded once on first use, never reloaded
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

use super::{OnnxSummarizer, OnnxTopicClassifier, Summarizer, TopicClassifier};
use crate::config::ModelsConfig;
use crate::types::{LengthBudget, SumTopicError, TopicPrediction};
use crate::debug_error;

pub struct ModelRegistry {
    config: ModelsConfig,
    summarizer: OnceCell<OnnxSummarizer>,
    classifier: OnceCell<OnnxTopicClassifier>,
}

impl ModelRegistry {
    pub fn new(config: ModelsConfig) -> Self {
        Self {
            config,
            summarizer: OnceCell::new(),
            classifier: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &ModelsConfig {
        &self.config
    }

    /// The summarizer, loading it on first call. A failed load is not cached.
    pub fn summarizer(&self) -> Result<&OnnxSummarizer> {
        self.summarizer.get_or_try_init(|| {
            OnnxSummarizer::load(
                &self.config.summarizer_dir(),
                self.config.intra_threads,
                self.config.num_beams,
            )
            .map_err(|e| {
                debug_error!("summarizer load failed: {:#}", e);
                anyhow::Error::new(SumTopicError::ModelLoad {
                    model: "summarization",
                    reason: format!("{:#}", e),
                })
            })
        })
    }

    pub fn classifier(&self) -> Result<&OnnxTopicClassifier> {
        self.classifier.get_or_try_init(|| {
            OnnxTopicClassifier::load(&self.config.classifier_dir(), self.config.intra_threads)
                .map_err(|e| {
                    debug_error!("classifier load failed: {:#}", e);
                    anyhow::Error::new(SumTopicError::ModelLoad {
                        model: "classification",
                        reason: format!("{:#}", e),
                    })
                })
        })
    }

    /// Load both models up front instead of on the first request.
    pub fn preload(&self) -> Result<()> {
        self.summarizer()?;
        self.classifier()?;
        Ok(())
    }

    pub fn is_loaded(&self) -> (bool, bool) {
        (self.summarizer.get().is_some(), self.classifier.get().is_some())
    }
}

impl Summarizer for ModelRegistry {
    fn summarize(&self, text: &str, budget: LengthBudget) -> Result<String> {
        self.summarizer()?
            .summarize(text, budget)
            .context(SumTopicError::Summarization("model call failed".to_string()))
    }
}

impl TopicClassifier for ModelRegistry {
    fn classify(&self, text: &str) -> Result<TopicPrediction> {
        self.classifier()?
            .classify(text)
            .context(SumTopicError::Classification("model call failed".to_string()))
    }
}
