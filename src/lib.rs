//! Lekha Server Library
//!
//! Upload a photographed or scanned note, get back a short summary as
//! text and PDF. The pipeline per upload: validate → preprocess the image
//! → OCR (Sinhala + English) → summarize with a pretrained model → write
//! artifacts.
//!
//! # Modules
//!
//! - `preprocess`: image cleanup ahead of OCR
//! - `ocr`: OCR engine seam + Tesseract CLI backend
//! - `summarize`: summarization service over an ONNX encoder–decoder
//! - `artifacts`: `.txt` / `.pdf` artifact writing
//! - `pipeline`: per-upload stage state machine
//! - `routes`: HTTP surface

use axum::{extract::DefaultBodyLimit, extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod artifacts;
pub mod config;
pub mod error;
pub mod flash;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod routes;
pub mod state;
pub mod summarize;

pub use config::Config;
pub use state::AppState;

/// Uploads past this size are rejected outright.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the full application router over the given state.
///
/// Shared between the server binary and the end-to-end tests, which
/// inject a mock OCR engine and a stub model through [`AppState`].
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .merge(routes::pages::router())
        .merge(routes::upload::router())
        .merge(routes::download::router())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
