// Subset of the Hugging Face config.json fields the runtime needs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default = "default_decoder_start")]
    pub decoder_start_token_id: u32,
    #[serde(default = "default_eos")]
    pub eos_token_id: u32,
    #[serde(default)]
    pub forced_bos_token_id: Option<u32>,
    #[serde(default)]
    pub forced_eos_token_id: Option<u32>,
    #[serde(default)]
    pub no_repeat_ngram_size: usize,
    #[serde(default = "default_one")]
    pub num_beams: usize,
    #[serde(default = "default_length_penalty")]
    pub length_penalty: f32,
    #[serde(default)]
    pub early_stopping: bool,
    #[serde(default = "default_max_positions")]
    pub max_position_embeddings: usize,
}

fn default_decoder_start() -> u32 { 2 }
fn default_eos() -> u32 { 2 }
fn default_one() -> usize { 1 }
fn default_length_penalty() -> f32 { 1.0 }
fn default_max_positions() -> usize { 1024 }

/// generation_config.json, when present, wins over config.json.
#[derive(Debug, Default, Deserialize)]
struct GenerationOverrides {
    decoder_start_token_id: Option<u32>,
    eos_token_id: Option<u32>,
    forced_bos_token_id: Option<u32>,
    forced_eos_token_id: Option<u32>,
    no_repeat_ngram_size: Option<usize>,
    num_beams: Option<usize>,
    length_penalty: Option<f32>,
    early_stopping: Option<bool>,
}

impl SummarizerConfig {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("config.json");
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut config = Self::parse(&content)?;

        let generation_path = dir.join("generation_config.json");
        if generation_path.exists() {
            let content = fs::read_to_string(&generation_path)
                .with_context(|| format!("reading {}", generation_path.display()))?;
            config.apply_generation_config(&content)?;
        }
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content).context("parsing summarizer config.json")?)
    }

    pub fn apply_generation_config(&mut self, content: &str) -> Result<()> {
        let overrides: GenerationOverrides =
            serde_json::from_str(content).context("parsing generation_config.json")?;
        if let Some(v) = overrides.decoder_start_token_id { self.decoder_start_token_id = v; }
        if let Some(v) = overrides.eos_token_id { self.eos_token_id = v; }
        if overrides.forced_bos_token_id.is_some() { self.forced_bos_token_id = overrides.forced_bos_token_id; }
        if overrides.forced_eos_token_id.is_some() { self.forced_eos_token_id = overrides.forced_eos_token_id; }
        if let Some(v) = overrides.no_repeat_ngram_size { self.no_repeat_ngram_size = v; }
        if let Some(v) = overrides.num_beams { self.num_beams = v; }
        if let Some(v) = overrides.length_penalty { self.length_penalty = v; }
        if let Some(v) = overrides.early_stopping { self.early_stopping = v; }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub id2label: BTreeMap<String, String>,
    #[serde(default)]
    pub problem_type: Option<String>,
    #[serde(default = "default_classifier_positions")]
    pub max_position_embeddings: usize,
}

fn default_classifier_positions() -> usize { 514 }

impl ClassifierConfig {
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("config.json");
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content).context("parsing classifier config.json")?)
    }

    pub fn is_multi_label(&self) -> bool {
        self.problem_type.as_deref() == Some("multi_label_classification")
    }

    /// Label for class index `idx`, falling back to `LABEL_<idx>`.
    pub fn label(&self, idx: usize) -> String {
        self.id2label
            .get(&idx.to_string())
            .cloned()
            .unwrap_or_else(|| format!("LABEL_{}", idx))
    }

    /// Longest token sequence the encoder accepts. RoBERTa-style models
    /// reserve two positions for padding offsets.
    pub fn max_input_tokens(&self) -> usize {
        self.max_position_embeddings.saturating_sub(2).clamp(1, 512)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BART_CNN: &str = r#"{
        "model_type": "bart",
        "bos_token_id": 0,
        "eos_token_id": 2,
        "pad_token_id": 1,
        "decoder_start_token_id": 2,
        "forced_bos_token_id": 0,
        "forced_eos_token_id": 2,
        "no_repeat_ngram_size": 3,
        "num_beams": 4,
        "length_penalty": 2.0,
        "early_stopping": true,
        "max_position_embeddings": 1024,
        "min_length": 56,
        "max_length": 142
    }"#;

    #[test]
    fn parses_bart_generation_fields() {
        let config = SummarizerConfig::parse(BART_CNN).unwrap();
        assert_eq!(config.decoder_start_token_id, 2);
        assert_eq!(config.forced_bos_token_id, Some(0));
        assert_eq!(config.no_repeat_ngram_size, 3);
        assert_eq!(config.num_beams, 4);
        assert_eq!(config.length_penalty, 2.0);
        assert!(config.early_stopping);
    }

    #[test]
    fn generation_config_overrides() {
        let mut config = SummarizerConfig::parse(BART_CNN).unwrap();
        config
            .apply_generation_config(r#"{"num_beams": 2, "no_repeat_ngram_size": 0}"#)
            .unwrap();
        assert_eq!(config.num_beams, 2);
        assert_eq!(config.no_repeat_ngram_size, 0);
        assert_eq!(config.forced_bos_token_id, Some(0));
    }

    #[test]
    fn token_ids_outside_generation_are_ignored() {
        let mut config = SummarizerConfig::parse(
            r#"{"bos_token_id": 0, "pad_token_id": 1, "eos_token_id": 3}"#,
        )
        .unwrap();
        config
            .apply_generation_config(r#"{"pad_token_id": 5, "decoder_start_token_id": 3}"#)
            .unwrap();
        assert_eq!(config.eos_token_id, 3);
        assert_eq!(config.decoder_start_token_id, 3);
        assert_eq!(config.forced_bos_token_id, None);
    }

    #[test]
    fn classifier_labels_and_problem_type() {
        let config = ClassifierConfig::parse(
            r#"{
                "id2label": {"0": "arts_&_culture", "1": "business_&_entrepreneurs"},
                "problem_type": "multi_label_classification",
                "max_position_embeddings": 514
            }"#,
        )
        .unwrap();
        assert!(config.is_multi_label());
        assert_eq!(config.label(1), "business_&_entrepreneurs");
        assert_eq!(config.label(7), "LABEL_7");
        assert_eq!(config.max_input_tokens(), 512);
    }
}
