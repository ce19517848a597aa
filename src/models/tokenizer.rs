// Tokenizer wrapper shared by both models
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tokenizers::tokenizer::{Tokenizer, TruncationParams};

use crate::debug_log;

pub struct TextTokenizer {
    tokenizer: Tokenizer,
    max_length: usize,
}

/// Token ids and attention mask, already widened for ONNX int64 inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedText {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
}

impl EncodedText {
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

impl TextTokenizer {
    /// Load `tokenizer.json` from `dir`, truncating encodings to `max_length` tokens.
    pub fn load(dir: &Path, max_length: usize) -> Result<Self> {
        let path = dir.join("tokenizer.json");
        debug_log(format!("Loading tokenizer from {}", path.display()));
        let mut tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("loading {}", path.display()))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("configuring truncation: {}", e))?;
        tokenizer.with_padding(None);
        Ok(Self { tokenizer, max_length })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn encode(&self, text: &str) -> Result<EncodedText> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("tokenizing input: {}", e))?;
        Ok(EncodedText {
            input_ids: encoding.get_ids().iter().map(|&id| id as i64).collect(),
            attention_mask: encoding.get_attention_mask().iter().map(|&m| m as i64).collect(),
        })
    }

    /// Decode ids to text with special tokens removed.
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        let text = self
            .tokenizer
            .decode(ids, true)
            .map_err(|e| anyhow!("decoding output: {}", e))?;
        Ok(text.trim().to_string())
    }
}
