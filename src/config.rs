//! Configuration management for Lekha Server

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ocr: OcrConfig,
    pub summarizer: SummarizerConfig,
    /// Signs the flash-message cookie. The default is a placeholder —
    /// set SECRET_KEY before deploying anywhere real.
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Where raw uploads (and their `_proc.png` siblings) land.
    pub upload_dir: PathBuf,
    /// Where summary artifacts (`<base>.txt` / `<base>.pdf`) are written.
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language codes, recognized simultaneously (joined with `+`).
    pub languages: Vec<String>,
    /// Tesseract executable; override when the binary is not on PATH.
    pub tesseract_cmd: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    /// Directory holding `encoder_model.onnx`, `decoder_model.onnx`
    /// and `tokenizer.json`.
    pub model_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("static/uploads"),
                output_dir: PathBuf::from("summaries"),
            },
            ocr: OcrConfig {
                languages: vec!["sin".to_string(), "eng".to_string()],
                tesseract_cmd: "tesseract".to_string(),
            },
            summarizer: SummarizerConfig {
                model_dir: PathBuf::from("models"),
            },
            secret_key: "replace_this_with_a_random_secret_for_prod".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.upload_dir),
                output_dir: env::var("OUTPUT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.output_dir),
            },
            ocr: OcrConfig {
                languages: env::var("OCR_LANGUAGES")
                    .map(|v| {
                        v.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or(defaults.ocr.languages),
                tesseract_cmd: env::var("TESSERACT_CMD").unwrap_or(defaults.ocr.tesseract_cmd),
            },
            summarizer: SummarizerConfig {
                model_dir: env::var("MODEL_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.summarizer.model_dir),
            },
            secret_key: env::var("SECRET_KEY").unwrap_or(defaults.secret_key),
        }
    }
}
