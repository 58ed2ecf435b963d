//! HTTP front end: the single-page upload / run / download form
//!
//! # Routes
//!
//! - `GET /` upload form with the threshold control
//! - `POST /preview` parse the upload and show its first rows
//! - `POST /predict` run the model and render results
//! - `POST /download` run the model and return the label CSV
//! - `GET /health` JSON status
//!
//! The upload is never stored: the preview page carries the CSV text in a
//! hidden field so the run trigger can post it back.

mod form;
mod handlers;
mod render;

pub use form::RunForm;
pub use handlers::HealthResponse;

use crate::config::{AppConfig, PresentationConfig};
use crate::models::{FraudModel, Threshold};
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Loaded once at startup
    pub model: Arc<dyn FraudModel>,
    /// Threshold stored with the model; request overrides never change it
    pub default_threshold: Threshold,
    pub presentation: PresentationConfig,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(model: Arc<dyn FraudModel>, default_threshold: Threshold, presentation: PresentationConfig) -> Self {
        Self {
            model,
            default_threshold,
            presentation,
            started_at: Utc::now(),
        }
    }
}

/// Build the application router
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/preview", post(handlers::preview))
        .route("/predict", post(handlers::predict))
        .route("/download", post(handlers::download))
        .route("/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(config: &AppConfig, state: AppState) -> Result<()> {
    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!(address = %address, "Serving ATM fraud detection form");

    axum::serve(listener, router(state, config.server.max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
