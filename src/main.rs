//! ATM Fraud Detection - Main Entry Point
//!
//! Loads the trained classifier and its threshold once, then serves the
//! upload/run/download form. Requests are handled one at a time on a
//! single-threaded runtime.

use anyhow::Result;
use atm_fraud_detection::{
    config::{AppConfig, LoggingConfig},
    models::{load_fraud_model, load_threshold},
    web::{self, AppState},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("atm_fraud_detection={}", logging.level).parse()?);

    if logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    init_logging(&config.logging)?;
    info!("Starting ATM Fraud Detection service");
    info!(
        model_path = %config.model.path,
        format = ?config.model.format,
        threshold_path = %config.model.threshold_path,
        "Configuration loaded successfully"
    );

    // Artifacts are loaded exactly once and shared read-only
    let model = load_fraud_model(&config.model)?;
    let default_threshold = load_threshold(&config.model.threshold_path)?;
    info!(
        model = %model.name(),
        default_threshold = default_threshold.value(),
        "Model and threshold loaded"
    );

    let state = AppState::new(model, default_threshold, config.presentation.clone());
    web::serve(&config, state).await?;

    info!("Service shutting down...");
    Ok(())
}
