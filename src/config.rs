//! Configuration management for the fraud detection service

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Serialization format of the trained classifier artifact
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    /// ONNX export of the trained pipeline, run through ONNX Runtime
    #[default]
    Onnx,
    /// JSON logistic regression artifact (intercept + per-feature coefficients)
    Logistic,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum accepted request body (uploads are held in memory)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

/// Trained model artifacts
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path to the serialized classifier
    pub path: String,
    /// Artifact format
    #[serde(default)]
    pub format: ModelFormat,
    /// Path to the serialized default decision threshold
    pub threshold_path: String,
    /// Number of intra-op threads for ONNX inference (default: 1)
    #[serde(default = "default_onnx_threads")]
    pub onnx_threads: usize,
    /// Name shown in the page footer
    #[serde(default = "default_display_name")]
    pub display_name: String,
}

fn default_onnx_threads() -> usize {
    1
}

fn default_display_name() -> String {
    "Stacking Classifier".to_string()
}

/// What the page shows
#[derive(Debug, Clone, Deserialize)]
pub struct PresentationConfig {
    /// Rows of the raw upload shown before a run
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    /// Rows of the scored table shown after a run
    #[serde(default = "default_result_rows")]
    pub result_rows: usize,
}

fn default_preview_rows() -> usize {
    5
}

fn default_result_rows() -> usize {
    20
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
            result_rows: default_result_rows(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default file plus `ATM_FRAUD__*` overrides
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("ATM_FRAUD").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the service cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.model.onnx_threads == 0 {
            anyhow::bail!("model.onnx_threads must be at least 1");
        }
        if self.server.max_upload_bytes == 0 {
            anyhow::bail!("server.max_upload_bytes must be positive");
        }
        if self.presentation.result_rows == 0 {
            anyhow::bail!("presentation.result_rows must be positive");
        }
        match self.logging.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => anyhow::bail!("logging.format must be \"json\" or \"pretty\", got {other:?}"),
        }
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8501,
                max_upload_bytes: default_max_upload_bytes(),
            },
            model: ModelConfig {
                path: "models/stacking_fraud_pipeline.onnx".to_string(),
                format: ModelFormat::Onnx,
                threshold_path: "models/best_stack_threshold.json".to_string(),
                onnx_threads: 1,
                display_name: default_display_name(),
            },
            presentation: PresentationConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
