//! Upload form page
//!
//! `GET /` renders the entry page and shows (then clears) any pending
//! flash message left by a redirect.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{AppendHeaders, Html, IntoResponse},
    routing::get,
    Router,
};

use crate::flash;
use crate::state::AppState;

/// Create the pages router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let message = flash::from_headers(&state.config().secret_key, &headers);
    let body = render_index(message.as_deref());
    (
        AppendHeaders([(header::SET_COOKIE, flash::clear_cookie())]),
        Html(body),
    )
}

fn render_index(flash_message: Option<&str>) -> String {
    let notice = match flash_message {
        Some(message) => format!(
            "<p class=\"flash\">{}</p>",
            html_escape::encode_text(message)
        ),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Lekha — Note Summarizer</title>
<style>
body {{ font-family: sans-serif; max-width: 40em; margin: 3em auto; }}
.flash {{ background: #fde8e8; border: 1px solid #c0392b; padding: 0.5em 1em; }}
</style>
</head>
<body>
<h1>Summarize a note</h1>
{notice}
<p>Upload a photo or scan of a note (png, jpg, jpeg). The text is read
with OCR (Sinhala and English) and condensed into a short summary you can
download as text or PDF.</p>
<form action="/upload" method="post" enctype="multipart/form-data">
  <input type="file" name="image" accept=".png,.jpg,.jpeg">
  <button type="submit">Upload and summarize</button>
</form>
</body>
</html>
"#
    )
}
