// Encoder/decoder summarizer (BART-style ONNX export) on ONNX Runtime
use anyhow::{anyhow, Context, Result};
use ndarray::{s, ArrayView3};
use ort::{
    inputs,
    session::builder::GraphOptimizationLevel,
    session::Session,
    value::Value,
};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use super::generation::{beam_search, GenerationParams};
use super::model_config::SummarizerConfig;
use super::tokenizer::TextTokenizer;
use super::Summarizer;
use crate::types::LengthBudget;
use crate::{debug_log, debug_timing};

pub const ENCODER_FILE: &str = "encoder_model.onnx";
pub const DECODER_FILE: &str = "decoder_model.onnx";

pub struct OnnxSummarizer {
    encoder: Mutex<Session>,
    decoder: Mutex<Session>,
    decoder_takes_mask: bool,
    tokenizer: TextTokenizer,
    params: GenerationParams,
}

/// Encoder output kept around for every decoder step.
struct EncoderState {
    hidden: Vec<f32>,
    seq_len: usize,
    hidden_size: usize,
    attention_mask: Vec<i64>,
}

pub(crate) fn load_session(path: &Path, intra_threads: usize) -> Result<Session> {
    debug_log(format!("  Loading {}", path.display()));
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(intra_threads)?
        .commit_from_file(path)
        .with_context(|| format!("loading {}", path.display()))?;
    Ok(session)
}

impl OnnxSummarizer {
    pub fn load(dir: &Path, intra_threads: usize, num_beams: Option<usize>) -> Result<Self> {
        debug_log(format!("Initializing summarizer from {}", dir.display()));
        let start = Instant::now();
        let config = SummarizerConfig::load(dir)?;
        super::init_runtime();
        let encoder = load_session(&dir.join(ENCODER_FILE), intra_threads)?;
        let decoder = load_session(&dir.join(DECODER_FILE), intra_threads)?;
        let decoder_takes_mask = decoder
            .inputs
            .iter()
            .any(|input| input.name == "encoder_attention_mask");
        let tokenizer = TextTokenizer::load(dir, config.max_position_embeddings)?;

        let params = GenerationParams {
            min_length: 0,
            max_length: 0,
            num_beams: num_beams.unwrap_or(config.num_beams).max(1),
            no_repeat_ngram_size: config.no_repeat_ngram_size,
            length_penalty: config.length_penalty,
            early_stopping: config.early_stopping,
            decoder_start_token_id: config.decoder_start_token_id,
            eos_token_id: config.eos_token_id,
            forced_bos_token_id: config.forced_bos_token_id,
            forced_eos_token_id: config.forced_eos_token_id,
        };
        debug_log(format!(
            "  Summarizer ready: {} beams, no_repeat_ngram_size={}, length_penalty={}",
            params.num_beams, params.no_repeat_ngram_size, params.length_penalty
        ));
        debug_timing!("Summarizer load", start);

        Ok(Self {
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            decoder_takes_mask,
            tokenizer,
            params,
        })
    }

    fn encode(&self, text: &str) -> Result<EncoderState> {
        let encoded = self.tokenizer.encode(text)?;
        if encoded.is_empty() {
            anyhow::bail!("input produced no tokens");
        }
        let seq_len = encoded.len();
        debug_log(format!("  Encoder input: {} tokens (limit {})", seq_len, self.tokenizer.max_length()));

        let input_ids = Value::from_array(([1_usize, seq_len], encoded.input_ids.into_boxed_slice()))?;
        let attention_mask = Value::from_array((
            [1_usize, seq_len],
            encoded.attention_mask.clone().into_boxed_slice(),
        ))?;

        let mut encoder = self
            .encoder
            .lock()
            .map_err(|_| anyhow!("encoder session lock poisoned"))?;
        let outputs = encoder.run(inputs![
            "input_ids" => input_ids,
            "attention_mask" => attention_mask
        ])?;
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        if dims.len() != 3 || dims[1] != seq_len {
            anyhow::bail!("unexpected encoder output shape {:?}", dims);
        }

        Ok(EncoderState {
            hidden: data.to_vec(),
            seq_len,
            hidden_size: dims[2],
            attention_mask: encoded.attention_mask,
        })
    }

    /// Next-token logits for each sequence in `sequences`.
    fn decode_step(&self, state: &EncoderState, sequences: &[Vec<u32>]) -> Result<Vec<Vec<f32>>> {
        let batch = sequences.len();
        let cur_len = sequences[0].len();

        let ids: Vec<i64> = sequences.iter().flatten().map(|&t| t as i64).collect();
        let hidden: Vec<f32> = state.hidden.repeat(batch);
        let mask: Vec<i64> = state.attention_mask.repeat(batch);

        let input_ids = Value::from_array(([batch, cur_len], ids.into_boxed_slice()))?;
        let encoder_hidden_states = Value::from_array((
            [batch, state.seq_len, state.hidden_size],
            hidden.into_boxed_slice(),
        ))?;

        let mut decoder = self
            .decoder
            .lock()
            .map_err(|_| anyhow!("decoder session lock poisoned"))?;
        let outputs = if self.decoder_takes_mask {
            let encoder_attention_mask =
                Value::from_array(([batch, state.seq_len], mask.into_boxed_slice()))?;
            decoder.run(inputs![
                "input_ids" => input_ids,
                "encoder_hidden_states" => encoder_hidden_states,
                "encoder_attention_mask" => encoder_attention_mask
            ])?
        } else {
            decoder.run(inputs![
                "input_ids" => input_ids,
                "encoder_hidden_states" => encoder_hidden_states
            ])?
        };

        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        if dims.len() != 3 || dims[0] != batch {
            anyhow::bail!("unexpected decoder logits shape {:?}", dims);
        }
        let logits = ArrayView3::from_shape((dims[0], dims[1], dims[2]), data)?;
        let last = dims[1] - 1;
        Ok((0..batch)
            .map(|b| logits.slice(s![b, last, ..]).to_vec())
            .collect())
    }
}

impl Summarizer for OnnxSummarizer {
    fn summarize(&self, text: &str, budget: LengthBudget) -> Result<String> {
        let start = Instant::now();
        let params = self.params.clone().with_budget(budget);
        debug_log(format!(
            "Summarizing: min_length={}, max_length={}, beams={}",
            params.min_length, params.max_length, params.num_beams
        ));

        let state = self.encode(text)?;
        let mut steps = 0usize;
        let tokens = beam_search(&params, |sequences| {
            steps += 1;
            self.decode_step(&state, sequences)
        })?;

        let summary = self.tokenizer.decode(&tokens)?;
        debug_log(format!(
            "  Decoding complete: {} steps -> {} tokens, {} chars",
            steps,
            tokens.len(),
            summary.len()
        ));
        debug_timing!("Summarization", start);
        Ok(summary)
    }
}
