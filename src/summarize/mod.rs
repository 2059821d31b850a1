//! Summarization service
//!
//! Wraps the pretrained model behind a small, infallible contract: the
//! caller always gets a string back. Empty input short-circuits to a
//! sentinel without touching the model; a model failure is logged and
//! mapped to a second sentinel. The model itself is loaded once at process
//! startup and shared read-only across requests.

mod model;

use std::path::Path;
use std::sync::Arc;

pub use model::{ModelError, OnnxSummaryModel, SummaryModel};

/// Returned for empty or whitespace-only input; the model is not invoked.
pub const NO_TEXT_FALLBACK: &str = "No text to summarize.";

/// Returned when the model errors out; never propagated as a hard failure.
pub const FAILURE_FALLBACK: &str = "Error during summarization.";

/// Hard input cutoff, in characters. Not sentence-aware.
pub const MAX_INPUT_CHARS: usize = 18_000;

/// Shared summarization service
#[derive(Clone)]
pub struct Summarizer {
    model: Arc<dyn SummaryModel>,
}

impl Summarizer {
    /// Wrap an already-constructed model (dependency injection seam;
    /// tests hand in a stub here).
    pub fn new(model: Arc<dyn SummaryModel>) -> Self {
        Self { model }
    }

    /// Load the ONNX model from disk. Expensive; call once at startup,
    /// before accepting requests.
    pub fn load(model_dir: &Path) -> Result<Self, ModelError> {
        Ok(Self::new(Arc::new(OnnxSummaryModel::load(model_dir)?)))
    }

    /// Summarize `text`, falling back to a sentinel on empty input or
    /// model failure. Deterministic for a given input.
    pub fn summarize(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return NO_TEXT_FALLBACK.to_string();
        }

        let truncated: String = trimmed.chars().take(MAX_INPUT_CHARS).collect();

        match self.model.generate(&truncated) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("summarization failed: {}", e);
                FAILURE_FALLBACK.to_string()
            }
        }
    }

    /// Run [`Self::summarize`] on the blocking pool. Inference pins a CPU
    /// core for seconds at a time; keep it off the async runtime threads.
    pub async fn summarize_off_thread(&self, text: String) -> String {
        let this = self.clone();
        match tokio::task::spawn_blocking(move || this.summarize(&text)).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!("summarization task failed: {}", e);
                FAILURE_FALLBACK.to_string()
            }
        }
    }
}
