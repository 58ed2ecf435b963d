//! Artifact loading: the trained classifier and its default threshold

use crate::config::{ModelConfig, ModelFormat};
use crate::models::inference::{FraudModel, OnnxModel};
use crate::models::logistic::LogisticModel;
use crate::models::threshold::Threshold;
use crate::schema::FEATURE_COUNT;
use anyhow::{Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// Model name
    pub name: String,
    /// ONNX Runtime session
    pub session: Session,
    /// Input name for the model
    pub input_name: String,
    /// Output name for probabilities
    pub output_name: String,
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        info!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Open the exported pipeline and resolve its feature input and
    /// probability output. Fails if the input cannot take one row of the
    /// expected schema.
    pub fn load_model<P: AsRef<Path>>(&self, path: P, name: &str) -> Result<LoadedModel> {
        let path = path.as_ref();
        info!(model = %name, path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        if session.inputs.len() != 1 {
            warn!(model = %name, inputs = session.inputs.len(), "Model has extra inputs; feeding the first");
        }
        let input = session
            .inputs
            .first()
            .with_context(|| format!("Model {name} declares no inputs"))?;
        if let Some(shape) = input.input_type.tensor_shape() {
            check_input_width(shape)
                .with_context(|| format!("Model {name} input '{}' does not match the feature schema", input.name))?;
        }
        let input_name = input.name.clone();

        // sklearn converters emit `output_label` then `output_probability`
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name.contains("prob"))
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .with_context(|| format!("Model {name} declares no outputs"))?;

        info!(
            model = %name,
            input = %input_name,
            output = %output_name,
            features = FEATURE_COUNT,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            name: name.to_string(),
            session,
            input_name,
            output_name,
        })
    }
}

/// Input dims must be `[batch, FEATURE_COUNT]`; negative dims are symbolic
fn check_input_width(dims: &[i64]) -> Result<()> {
    match dims {
        [_, width] if *width < 0 || *width == FEATURE_COUNT as i64 => Ok(()),
        [_, width] => anyhow::bail!("expected {FEATURE_COUNT} features, model takes {width}"),
        other => anyhow::bail!("expected a 2-D input, got shape {other:?}"),
    }
}

/// Serialized default threshold: `{"threshold": 0.42}` or a bare `0.42`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ThresholdArtifact {
    Wrapped { threshold: f64 },
    Bare(f64),
}

/// Parse a threshold artifact from its JSON text
pub fn parse_threshold(json: &str) -> Result<Threshold> {
    let artifact: ThresholdArtifact =
        serde_json::from_str(json).context("Threshold artifact is not a JSON number or {\"threshold\": ..}")?;
    let value = match artifact {
        ThresholdArtifact::Wrapped { threshold } => threshold,
        ThresholdArtifact::Bare(threshold) => threshold,
    };
    Threshold::new(value).context("Stored threshold is invalid")
}

/// Load the default decision threshold bundled with the model
pub fn load_threshold<P: AsRef<Path>>(path: P) -> Result<Threshold> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read threshold artifact {}", path.display()))?;
    let threshold = parse_threshold(&json)?;
    info!(path = %path.display(), threshold = threshold.value(), "Default threshold loaded");
    Ok(threshold)
}

/// Load the configured classifier once; the handle is shared for the
/// lifetime of the process.
pub fn load_fraud_model(config: &ModelConfig) -> Result<Arc<dyn FraudModel>> {
    let model: Arc<dyn FraudModel> = match config.format {
        ModelFormat::Onnx => {
            let loader = ModelLoader::with_threads(config.onnx_threads)?;
            let loaded = loader.load_model(&config.path, &config.display_name)?;
            Arc::new(OnnxModel::new(loaded, config.display_name.clone()))
        }
        ModelFormat::Logistic => Arc::new(LogisticModel::from_path(&config.path)?),
    };

    info!(model = %model.name(), format = ?config.format, "Fraud model ready");
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_threshold_formats() {
        assert_eq!(parse_threshold("{\"threshold\": 0.37}").unwrap().value(), 0.37);
        assert_eq!(parse_threshold("0.61").unwrap().value(), 0.61);
        assert!(parse_threshold("1.7").is_err());
        assert!(parse_threshold("\"high\"").is_err());
    }

    #[test]
    fn test_load_threshold_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"threshold\": 0.25}}").unwrap();
        assert_eq!(load_threshold(file.path()).unwrap().value(), 0.25);
    }

    #[test]
    fn test_load_threshold_missing_file() {
        let err = load_threshold("/nonexistent/threshold.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read threshold artifact"));
    }

    #[test]
    fn test_check_input_width() {
        assert!(check_input_width(&[-1, 32]).is_ok());
        assert!(check_input_width(&[10, 32]).is_ok());
        assert!(check_input_width(&[-1, -1]).is_ok());

        let err = check_input_width(&[-1, 31]).unwrap_err();
        assert_eq!(err.to_string(), "expected 32 features, model takes 31");
        assert!(check_input_width(&[32]).is_err());
        assert!(check_input_width(&[1, 1, 32]).is_err());
    }
}
