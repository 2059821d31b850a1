//! Artifact download route
//!
//! Serves summary artifacts from the output directory as attachments.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};

use crate::error::AppError;
use crate::flash;
use crate::state::AppState;

/// Create the download router
pub fn router() -> Router<AppState> {
    Router::new().route("/download/:filename", get(download))
}

async fn download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let secret = &state.config().secret_key;

    // Flat directory only; anything path-like is treated as absent.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Ok(flash::redirect_to_index(secret, "File not found"));
    }

    let path = state.artifacts().output_dir().join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(flash::redirect_to_index(secret, "File not found"));
        }
        Err(e) => return Err(AppError::Io(e)),
    };

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&filename))
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(response)
}

/// Content type from the artifact extension
fn content_type_for(filename: &str) -> &'static str {
    let ext = filename.rsplit('.').next().unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "txt" => "text/plain; charset=utf-8",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_content_types() {
        assert_eq!(content_type_for("note.txt"), "text/plain; charset=utf-8");
        assert_eq!(content_type_for("note.pdf"), "application/pdf");
        assert_eq!(content_type_for("note.bin"), "application/octet-stream");
    }
}
