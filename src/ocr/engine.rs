//! OCR engines
//!
//! Defines the engine trait and the Tesseract-backed implementation.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use uuid::Uuid;

use super::OcrError;

/// OCR engine seam
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Human-readable engine name for logs.
    fn name(&self) -> &str;

    /// Check whether the engine can run at all (binary present, etc).
    async fn is_available(&self) -> bool;

    /// Recognize text in an image file. An empty string is a valid result
    /// (no recognizable text), not an error.
    async fn recognize(&self, image_path: &Path, languages: &[String])
        -> Result<String, OcrError>;
}

/// Join language codes into Tesseract's multi-language format
/// (e.g. `["sin", "eng"]` → `"sin+eng"`). Falls back to `eng` when the
/// list is empty.
pub fn join_languages(languages: &[String]) -> String {
    if languages.is_empty() {
        "eng".to_string()
    } else {
        languages.join("+")
    }
}

/// Tesseract CLI engine
///
/// Spawns the `tesseract` binary per request. Recognition for all
/// configured languages happens in a single pass, which is what makes
/// mixed Sinhala/English notes come out in reading order.
pub struct TesseractEngine {
    command: String,
}

impl TesseractEngine {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        match Command::new(&self.command).arg("--version").output().await {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }

    async fn recognize(
        &self,
        image_path: &Path,
        languages: &[String],
    ) -> Result<String, OcrError> {
        let lang = join_languages(languages);

        // Tesseract writes `<base>.txt` next to whatever base path it is
        // handed; park that in the system temp dir.
        let output_base = std::env::temp_dir().join(format!("lekha_ocr_{}", Uuid::new_v4()));

        let output = Command::new(&self.command)
            .arg(image_path)
            .arg(&output_base)
            .args(["-l", &lang, "--oem", "3", "--psm", "3"])
            .output()
            .await
            .map_err(|e| OcrError::Spawn(format!("{}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(stderr.trim().to_string()));
        }

        let output_file = format!("{}.txt", output_base.display());
        let text = tokio::fs::read_to_string(&output_file)
            .await
            .map_err(|e| OcrError::Output(e.to_string()))?;

        let _ = tokio::fs::remove_file(&output_file).await;

        tracing::debug!(
            image = %image_path.display(),
            languages = %lang,
            chars = text.len(),
            "OCR pass complete"
        );

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_join_with_plus() {
        let langs = vec!["sin".to_string(), "eng".to_string()];
        assert_eq!(join_languages(&langs), "sin+eng");
    }

    #[test]
    fn single_language_passes_through() {
        assert_eq!(join_languages(&["eng".to_string()]), "eng");
    }

    #[test]
    fn empty_language_list_falls_back_to_english() {
        assert_eq!(join_languages(&[]), "eng");
    }
}
