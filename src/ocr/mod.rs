//! OCR Module
//!
//! Extracts text from preprocessed note images. The engine sits behind a
//! trait so the pipeline (and its tests) never care which backend runs;
//! the production backend shells out to the Tesseract binary with combined
//! multi-language recognition (Sinhala + English by default).

mod engine;

pub use engine::{join_languages, OcrEngine, TesseractEngine};

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("failed to launch OCR engine: {0}")]
    Spawn(String),

    #[error("OCR engine failed: {0}")]
    Engine(String),

    #[error("failed to read OCR output: {0}")]
    Output(String),
}
