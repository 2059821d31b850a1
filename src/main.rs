//! Lekha Server
//!
//! A small web application that turns photographed or scanned notes into
//! short summaries: image preprocessing, OCR (Sinhala + English), an
//! offline summarization model, and downloadable text/PDF artifacts.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lekha_server::ocr::{OcrEngine, TesseractEngine};
use lekha_server::summarize::Summarizer;
use lekha_server::{app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lekha_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Lekha Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Upload dir: {}", config.storage.upload_dir.display());
    tracing::info!("Output dir: {}", config.storage.output_dir.display());

    // OCR engine; the server still starts without the binary, requests
    // just degrade to empty extracted text.
    let ocr = Arc::new(TesseractEngine::new(config.ocr.tesseract_cmd.clone()));
    if !ocr.is_available().await {
        tracing::warn!(
            "tesseract binary '{}' not found; OCR will fail until it is installed",
            config.ocr.tesseract_cmd
        );
    }

    // Load the summarization model eagerly, before accepting any requests.
    tracing::info!(
        "Loading summarization model from {} (this can take a while)...",
        config.summarizer.model_dir.display()
    );
    let summarizer = Summarizer::load(&config.summarizer.model_dir)
        .context("failed to load summarization model")?;
    tracing::info!("Summarization model loaded");

    // Create application state and the working directories.
    let state = AppState::new(config.clone(), ocr, summarizer);
    state
        .ensure_directories()
        .context("failed to create upload/output directories")?;

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Lekha Server listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
