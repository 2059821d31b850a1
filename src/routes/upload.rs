//! Upload route
//!
//! `POST /upload` accepts a multipart form with an `image` field, runs
//! the pipeline, and renders the result page. Validation and
//! preprocessing failures bounce back to `/` with a flash message; OCR
//! and summarization failures surface as warnings on the result page.

use axum::{
    extract::{Multipart, State},
    response::{Html, IntoResponse, Response},
    routing::post,
    Router,
};

use crate::error::AppError;
use crate::flash;
use crate::pipeline::{self, PipelineError, PipelineOutput};
use crate::state::AppState;

/// Extensions accepted for upload, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Create the upload router
pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let secret = state.config().secret_key.clone();

    // Received → Validated: the image part must exist, carry a filename,
    // and have an allowed extension. Anything else aborts before any
    // expensive work.
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            upload = Some((filename, data.to_vec()));
            break;
        }
    }

    let Some((filename, data)) = upload else {
        return Ok(flash::redirect_to_index(&secret, "No image part"));
    };
    if filename.is_empty() {
        return Ok(flash::redirect_to_index(&secret, "No selected file"));
    }
    if !allowed_file(&filename) {
        return Ok(flash::redirect_to_index(
            &secret,
            "File type not allowed. Only png, jpg, jpeg.",
        ));
    }

    let safe_name = sanitize_filename(&filename);

    match pipeline::run(&state, &safe_name, &data).await {
        Ok(output) => Ok(Html(render_result(&output)).into_response()),
        Err(PipelineError::Preprocess(detail)) => Ok(flash::redirect_to_index(
            &secret,
            &format!("Preprocessing failed: {}", detail),
        )),
        Err(e) => Err(AppError::Internal(e.to_string())),
    }
}

/// True when the filename has a period-separated extension in the
/// allow-set, case-insensitively.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce a client-supplied filename to a safe flat filesystem key:
/// directory components dropped, anything outside `[A-Za-z0-9._-]`
/// replaced with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let leaf = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let cleaned: String = leaf
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches(['.', '_']).to_string();
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed
    }
}

fn render_result(output: &PipelineOutput) -> String {
    let warnings = if output.warnings.is_empty() {
        String::new()
    } else {
        let items: String = output
            .warnings
            .iter()
            .map(|w| format!("<li>{}</li>", html_escape::encode_text(w)))
            .collect();
        format!("<ul class=\"flash\">{}</ul>", items)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Summary — {filename}</title>
<style>
body {{ font-family: sans-serif; max-width: 40em; margin: 3em auto; }}
.flash {{ background: #fde8e8; border: 1px solid #c0392b; padding: 0.5em 1em; }}
pre {{ background: #f4f4f4; padding: 1em; white-space: pre-wrap; }}
</style>
</head>
<body>
<h1>Summary for {filename}</h1>
{warnings}
<h2>Extracted text</h2>
<pre>{extracted}</pre>
<h2>Summary</h2>
<p>{summary}</p>
<p>
  <a href="/download/{txt_link}" download>Download .txt</a> ·
  <a href="/download/{pdf_link}" download>Download .pdf</a>
</p>
<p><a href="/">Summarize another note</a></p>
</body>
</html>
"#,
        filename = html_escape::encode_text(&output.uploaded_filename),
        warnings = warnings,
        extracted = html_escape::encode_text(&output.extracted_text),
        summary = html_escape::encode_text(&output.summary),
        txt_link = urlencoding::encode(&output.txt_filename),
        pdf_link = urlencoding::encode(&output.pdf_filename),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_extensions_pass_in_any_case() {
        for name in [
            "note.png", "note.jpg", "note.jpeg", "NOTE.PNG", "NOTE.JPG", "NOTE.JPEG",
            "photo.JpEg",
        ] {
            assert!(allowed_file(name), "{} should be allowed", name);
        }
    }

    #[test]
    fn disallowed_extensions_are_rejected() {
        for name in ["note.txt", "note.pdf", "note.gif", "note.webp", "archive.png.zip"] {
            assert!(!allowed_file(name), "{} should be rejected", name);
        }
    }

    #[test]
    fn filenames_without_an_extension_are_rejected() {
        assert!(!allowed_file("note"));
        assert!(!allowed_file(""));
    }

    #[test]
    fn only_the_final_extension_counts() {
        assert!(allowed_file("archive.tar.png"));
        assert!(!allowed_file("image.png.txt"));
    }

    #[test]
    fn sanitize_strips_directory_components() {
        assert_eq!(sanitize_filename("../../etc/passwd.png"), "passwd.png");
        assert_eq!(sanitize_filename("C:\\notes\\note.jpg"), "note.jpg");
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("my note (1).png"), "my_note__1_.png");
    }

    #[test]
    fn sanitize_never_returns_an_empty_name() {
        assert_eq!(sanitize_filename("..."), "upload");
        assert_eq!(sanitize_filename(""), "upload");
    }

    #[test]
    fn result_page_escapes_extracted_text() {
        let output = PipelineOutput {
            uploaded_filename: "note.png".to_string(),
            extracted_text: "<img src=x onerror=alert(1)>".to_string(),
            summary: "ok".to_string(),
            txt_filename: "note.txt".to_string(),
            pdf_filename: "note.pdf".to_string(),
            warnings: vec![],
        };
        let page = render_result(&output);
        assert!(!page.contains("<img src=x"));
        assert!(page.contains("&lt;img"));
    }
}
