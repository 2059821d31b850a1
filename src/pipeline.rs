//! Upload pipeline
//!
//! One upload moves through `Received → Validated → Preprocessed →
//! Extracted → Summarized → Persisted`; the handler renders `Responded`.
//! Each stage yields an explicit result the next step switches on, so the
//! degradation rules are visible in one place: a preprocessing failure
//! aborts the upload, OCR and summarization failures degrade (empty text /
//! failure sentinel) and the pipeline runs to completion.

use crate::artifacts::ArtifactError;
use crate::preprocess;
use crate::state::AppState;
use crate::summarize::FAILURE_FALLBACK;

/// Everything the result page needs about a completed upload.
#[derive(Debug)]
pub struct PipelineOutput {
    pub uploaded_filename: String,
    pub extracted_text: String,
    pub summary: String,
    pub txt_filename: String,
    pub pdf_filename: String,
    /// Stage failures that degraded instead of aborting.
    pub warnings: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Recoverable: the upload is abandoned with a flash message, the
    /// server keeps running.
    #[error("Preprocessing failed: {0}")]
    Preprocess(String),

    /// Disk trouble while saving the upload itself.
    #[error("could not store upload: {0}")]
    StoreUpload(#[from] std::io::Error),

    /// Disk trouble while persisting artifacts. Fatal for the request.
    #[error(transparent)]
    Persist(#[from] ArtifactError),
}

/// Run the full pipeline for one validated upload.
///
/// `filename` must already be sanitized; `data` is the raw upload body.
pub async fn run(
    state: &AppState,
    filename: &str,
    data: &[u8],
) -> Result<PipelineOutput, PipelineError> {
    let mut warnings = Vec::new();

    // Received → (stored): fixed path keyed by filename, last write wins.
    let upload_path = state.config().storage.upload_dir.join(filename);
    tokio::fs::write(&upload_path, data).await?;
    tracing::info!(file = %upload_path.display(), bytes = data.len(), "upload stored");

    // Validated → Preprocessed. Abort the upload on failure; no OCR or
    // summarization is attempted.
    let preprocess_input = upload_path.clone();
    let processed_path =
        match tokio::task::spawn_blocking(move || preprocess::preprocess_image(&preprocess_input))
            .await
        {
            Ok(Ok(path)) => path,
            Ok(Err(e)) => return Err(PipelineError::Preprocess(e.to_string())),
            Err(e) => return Err(PipelineError::Preprocess(e.to_string())),
        };

    // Preprocessed → Extracted. Engine failure degrades to empty text.
    let languages = &state.config().ocr.languages;
    let extracted_text = match state.ocr().recognize(&processed_path, languages).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "OCR failed, continuing with empty text");
            warnings.push(format!("OCR failed: {}", e));
            String::new()
        }
    };

    // Extracted → Summarized. The summarizer never hard-fails; a model
    // failure surfaces as its sentinel, which we flag to the user.
    let summary = state
        .summarizer()
        .summarize_off_thread(extracted_text.clone())
        .await;
    if summary == FAILURE_FALLBACK {
        warnings.push("Summarization failed".to_string());
    }

    // Summarized → Persisted. Disk I/O failure here is fatal for the
    // request; a crash between the two writes can leave the pair
    // incomplete.
    let base = base_name(filename);
    state.artifacts().write_text(&base, &summary)?;
    state.artifacts().write_pdf(&base, &summary)?;

    tracing::info!(
        file = filename,
        extracted_chars = extracted_text.len(),
        summary_chars = summary.len(),
        warnings = warnings.len(),
        "pipeline complete"
    );

    Ok(PipelineOutput {
        uploaded_filename: filename.to_string(),
        extracted_text,
        summary,
        txt_filename: format!("{}.txt", base),
        pdf_filename: format!("{}.pdf", base),
        warnings,
    })
}

/// Filename with its final extension stripped (`note.jpg` → `note`).
pub fn base_name(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base.to_string(),
        _ => filename.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_the_extension() {
        assert_eq!(base_name("note.jpg"), "note");
        assert_eq!(base_name("archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn base_name_without_extension_is_unchanged() {
        assert_eq!(base_name("noext"), "noext");
        assert_eq!(base_name(".hidden"), ".hidden");
    }
}
