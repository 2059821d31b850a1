//! Application state management

use std::sync::Arc;

use crate::artifacts::ArtifactWriter;
use crate::config::Config;
use crate::ocr::OcrEngine;
use crate::summarize::Summarizer;

/// Shared application state
///
/// The OCR engine and the summarizer are constructed once at startup and
/// injected here; request handlers only ever see these read-only handles.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    ocr: Arc<dyn OcrEngine>,
    summarizer: Summarizer,
    artifacts: ArtifactWriter,
}

impl AppState {
    pub fn new(config: Config, ocr: Arc<dyn OcrEngine>, summarizer: Summarizer) -> Self {
        let artifacts = ArtifactWriter::new(config.storage.output_dir.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                ocr,
                summarizer,
                artifacts,
            }),
        }
    }

    /// Create the upload and output directories if absent.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.inner.config.storage.upload_dir)?;
        std::fs::create_dir_all(&self.inner.config.storage.output_dir)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn ocr(&self) -> &dyn OcrEngine {
        self.inner.ocr.as_ref()
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.inner.summarizer
    }

    pub fn artifacts(&self) -> &ArtifactWriter {
        &self.inner.artifacts
    }
}
