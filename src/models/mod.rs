// Pretrained model collaborators: summarizer and topic classifier
pub mod classifier;
pub mod generation;
pub mod model_config;
pub mod registry;
pub mod summarizer;
pub mod tokenizer;

use anyhow::Result;

use crate::types::{LengthBudget, TopicPrediction};

pub use classifier::OnnxTopicClassifier;
pub use registry::ModelRegistry;
pub use summarizer::OnnxSummarizer;

/// Abstractive summarizer. Must decode deterministically.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str, budget: LengthBudget) -> Result<String>;
}

/// Top-1 topic label for a piece of text.
pub trait TopicClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<TopicPrediction>;
}

pub(crate) fn init_runtime() {
    let _ = ort::init().with_name("sumtopic").commit();
}
