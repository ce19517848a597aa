// Sequence classification model for topic labels
use anyhow::{anyhow, Result};
use ort::{inputs, session::Session, value::Value};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use super::model_config::ClassifierConfig;
use super::summarizer::load_session;
use super::tokenizer::TextTokenizer;
use super::TopicClassifier;
use crate::types::TopicPrediction;
use crate::{debug_log, debug_timing};

pub const MODEL_FILE: &str = "model.onnx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFunction {
    Sigmoid,
    Softmax,
}

impl ScoreFunction {
    /// Same choice the text-classification pipeline makes: sigmoid for
    /// multi-label or single-logit heads, softmax otherwise.
    pub fn for_config(config: &ClassifierConfig, num_labels: usize) -> Self {
        if config.is_multi_label() || num_labels == 1 {
            ScoreFunction::Sigmoid
        } else {
            ScoreFunction::Softmax
        }
    }

    pub fn apply(self, logits: &[f32]) -> Vec<f32> {
        match self {
            ScoreFunction::Sigmoid => logits.iter().map(|&x| 1.0 / (1.0 + (-x).exp())).collect(),
            ScoreFunction::Softmax => {
                let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
                let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
                let sum: f32 = exps.iter().sum();
                exps.into_iter().map(|e| e / sum).collect()
            }
        }
    }
}

/// Highest scoring class as (index, score).
pub fn top_prediction(scores: &[f32]) -> Option<(usize, f32)> {
    scores
        .iter()
        .cloned()
        .enumerate()
        .filter(|(_, s)| !s.is_nan())
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
}

pub struct OnnxTopicClassifier {
    session: Mutex<Session>,
    takes_token_type_ids: bool,
    tokenizer: TextTokenizer,
    config: ClassifierConfig,
}

impl OnnxTopicClassifier {
    pub fn load(dir: &Path, intra_threads: usize) -> Result<Self> {
        debug_log(format!("Initializing topic classifier from {}", dir.display()));
        let start = Instant::now();
        let config = ClassifierConfig::load(dir)?;
        super::init_runtime();
        let session = load_session(&dir.join(MODEL_FILE), intra_threads)?;
        let takes_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");
        let tokenizer = TextTokenizer::load(dir, config.max_input_tokens())?;

        debug_log(format!(
            "  Classifier ready: {} labels, multi_label={}",
            config.id2label.len(),
            config.is_multi_label()
        ));
        debug_timing!("Classifier load", start);

        Ok(Self {
            session: Mutex::new(session),
            takes_token_type_ids,
            tokenizer,
            config,
        })
    }
}

impl TopicClassifier for OnnxTopicClassifier {
    fn classify(&self, text: &str) -> Result<TopicPrediction> {
        let start = Instant::now();
        let encoded = self.tokenizer.encode(text)?;
        let len = encoded.len();

        let input_ids = Value::from_array(([1_usize, len], encoded.input_ids.into_boxed_slice()))?;
        let attention_mask =
            Value::from_array(([1_usize, len], encoded.attention_mask.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("classifier session lock poisoned"))?;
        let outputs = if self.takes_token_type_ids {
            let token_type_ids = Value::from_array(([1_usize, len], vec![0_i64; len].into_boxed_slice()))?;
            session.run(inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask,
                "token_type_ids" => token_type_ids
            ])?
        } else {
            session.run(inputs![
                "input_ids" => input_ids,
                "attention_mask" => attention_mask
            ])?
        };

        let (shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
        let num_labels = shape.last().map(|&d| d as usize).unwrap_or(0);
        if num_labels == 0 || logits.len() < num_labels {
            anyhow::bail!("classifier returned no logits");
        }
        let logits = &logits[..num_labels];

        let scores = ScoreFunction::for_config(&self.config, num_labels).apply(logits);
        let (idx, score) =
            top_prediction(&scores).ok_or_else(|| anyhow!("classifier produced no usable score"))?;
        let prediction = TopicPrediction::new(self.config.label(idx), score);

        debug_log(format!("  Topic: {} ({:.4})", prediction.label, prediction.score));
        debug_timing!("Classification", start);
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(problem_type: Option<&str>) -> ClassifierConfig {
        ClassifierConfig {
            id2label: Default::default(),
            problem_type: problem_type.map(str::to_string),
            max_position_embeddings: 514,
        }
    }

    #[test]
    fn multi_label_uses_sigmoid() {
        let f = ScoreFunction::for_config(&config(Some("multi_label_classification")), 19);
        assert_eq!(f, ScoreFunction::Sigmoid);
        let scores = f.apply(&[0.0, 2.0]);
        assert!((scores[0] - 0.5).abs() < 1e-6);
        assert!(scores[1] > 0.88 && scores[1] < 0.89);
    }

    #[test]
    fn single_label_uses_softmax() {
        let f = ScoreFunction::for_config(&config(None), 3);
        assert_eq!(f, ScoreFunction::Softmax);
        let scores = f.apply(&[1.0, 1.0, 1.0]);
        assert!(scores.iter().all(|s| (s - 1.0 / 3.0).abs() < 1e-6));
    }

    #[test]
    fn single_logit_uses_sigmoid() {
        assert_eq!(ScoreFunction::for_config(&config(None), 1), ScoreFunction::Sigmoid);
    }

    #[test]
    fn picks_top_label() {
        assert_eq!(top_prediction(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
        assert_eq!(top_prediction(&[]), None);
    }
}
