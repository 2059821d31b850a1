//! ONNX summarization model
//!
//! Runs an exported encoder–decoder summarization model (BART-family)
//! through ONNX Runtime: one encoder pass over the tokenized input, then
//! greedy autoregressive decoding against the cached encoder states until
//! EOS or the token budget runs out. Greedy argmax with no sampling keeps
//! the output deterministic for a given input.

use std::path::Path;

use ort::{
    session::builder::GraphOptimizationLevel, session::Session, value::Value,
};
use parking_lot::Mutex;
use tokenizers::Tokenizer;

/// Encoder context window; tokens beyond this are dropped.
const MAX_INPUT_TOKENS: usize = 1024;

/// Summary length bounds, in generated tokens. EOS is suppressed until the
/// minimum is reached.
const MIN_SUMMARY_TOKENS: usize = 50;
const MAX_SUMMARY_TOKENS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to initialize summarization model: {0}")]
    Init(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("inference error: {0}")]
    Inference(String),
}

/// Model seam for the summarization service
///
/// Synchronous on purpose: callers route invocations through the blocking
/// pool. Implementations must be shareable across requests.
pub trait SummaryModel: Send + Sync {
    fn generate(&self, text: &str) -> Result<String, ModelError>;
}

/// Summarization model backed by ONNX Runtime sessions
///
/// Session runs need exclusive access, so each session sits behind a
/// mutex — invocations are serialized, which also answers the question of
/// whether the runtime tolerates concurrent inference.
pub struct OnnxSummaryModel {
    encoder: Mutex<Session>,
    decoder: Mutex<Session>,
    tokenizer: Tokenizer,
    bos_id: u32,
    eos_id: u32,
}

impl OnnxSummaryModel {
    /// Load `encoder_model.onnx`, `decoder_model.onnx` and
    /// `tokenizer.json` from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        let _ = ort::init();

        let encoder = load_session(&model_dir.join("encoder_model.onnx"))?;
        let decoder = load_session(&model_dir.join("decoder_model.onnx"))?;

        let tokenizer = Tokenizer::from_file(model_dir.join("tokenizer.json"))
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;

        let bos_id = tokenizer.token_to_id("<s>").unwrap_or(0);
        let eos_id = tokenizer.token_to_id("</s>").unwrap_or(2);

        Ok(Self {
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            tokenizer,
            bos_id,
            eos_id,
        })
    }
}

fn load_session(path: &Path) -> Result<Session, ModelError> {
    Session::builder()
        .and_then(|b| Ok(b.with_optimization_level(GraphOptimizationLevel::Level3)?))
        .and_then(|b| Ok(b.with_intra_threads(4)?))
        .and_then(|mut b| b.commit_from_file(path))
        .map_err(|e| ModelError::Init(format!("{}: {}", path.display(), e)))
}

impl SummaryModel for OnnxSummaryModel {
    fn generate(&self, text: &str) -> Result<String, ModelError> {
        // Tokenize and clamp to the encoder context window.
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;
        let mut input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        input_ids.truncate(MAX_INPUT_TOKENS);
        let input_len = input_ids.len();
        let attention: Vec<i64> = vec![1; input_len];

        // Single encoder pass; the hidden states feed every decoder step.
        let (encoder_shape, encoder_states) = {
            let ids = Value::from_array(([1_usize, input_len], input_ids.into_boxed_slice()))
                .map_err(|e| ModelError::Inference(e.to_string()))?;
            let mask = Value::from_array(([1_usize, input_len], attention.into_boxed_slice()))
                .map_err(|e| ModelError::Inference(e.to_string()))?;

            let mut encoder = self.encoder.lock();
            let outputs = encoder
                .run(ort::inputs!["input_ids" => ids, "attention_mask" => mask])
                .map_err(|e| ModelError::Inference(e.to_string()))?;

            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::Inference(e.to_string()))?;
            (shape.to_vec(), data.to_vec())
        };

        // Greedy decode. BART decoders start from [EOS, BOS].
        let mut decoder_ids: Vec<i64> = vec![self.eos_id as i64, self.bos_id as i64];
        let mut generated: Vec<u32> = Vec::new();

        let mut decoder = self.decoder.lock();
        for _ in 0..MAX_SUMMARY_TOKENS {
            let ids = Value::from_array((
                [1_usize, decoder_ids.len()],
                decoder_ids.clone().into_boxed_slice(),
            ))
            .map_err(|e| ModelError::Inference(e.to_string()))?;
            let states = Value::from_array((
                encoder_shape.clone(),
                encoder_states.clone().into_boxed_slice(),
            ))
            .map_err(|e| ModelError::Inference(e.to_string()))?;
            let mask = Value::from_array(([1_usize, input_len], vec![1i64; input_len].into_boxed_slice()))
                .map_err(|e| ModelError::Inference(e.to_string()))?;

            let outputs = decoder
                .run(ort::inputs![
                    "input_ids" => ids,
                    "encoder_hidden_states" => states,
                    "encoder_attention_mask" => mask
                ])
                .map_err(|e| ModelError::Inference(e.to_string()))?;

            let (logits_shape, logits) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| ModelError::Inference(e.to_string()))?;

            let vocab_size = logits_shape[2] as usize;
            let last_start = ((logits_shape[1] - 1) * logits_shape[2]) as usize;
            let last_logits = &logits[last_start..last_start + vocab_size];

            let next_id = argmax(last_logits, |id| {
                // Hold EOS back until the summary reaches its minimum length.
                id == self.eos_id && generated.len() < MIN_SUMMARY_TOKENS
            });

            if next_id == self.eos_id {
                break;
            }

            generated.push(next_id);
            decoder_ids.push(next_id as i64);
        }
        drop(decoder);

        let summary = self
            .tokenizer
            .decode(&generated, true)
            .map_err(|e| ModelError::Tokenizer(e.to_string()))?;

        tracing::debug!(
            input_tokens = input_len,
            summary_tokens = generated.len(),
            "summary generated"
        );

        Ok(summary.trim().to_string())
    }
}

/// Index of the largest logit, skipping suppressed token ids.
fn argmax(logits: &[f32], suppress: impl Fn(u32) -> bool) -> u32 {
    let mut best_id = 0u32;
    let mut best_value = f32::NEG_INFINITY;
    for (id, &value) in logits.iter().enumerate() {
        let id = id as u32;
        if suppress(id) {
            continue;
        }
        if value > best_value {
            best_value = value;
            best_id = id;
        }
    }
    best_id
}
