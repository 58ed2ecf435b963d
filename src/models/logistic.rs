//! Logistic regression artifact stored as JSON.
//!
//! Scores `sigmoid(intercept + Σ coef_i * (x_i - mean_i) / scale_i)` over the
//! expected features. Coefficients must name every feature exactly once.

use crate::error::InferenceError;
use crate::models::inference::{check_probabilities, feature_matrix, FraudModel};
use crate::schema::{EXPECTED_COLUMNS, FEATURE_COUNT};
use crate::types::AlignedDataset;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct LogisticArtifact {
    #[serde(default)]
    name: Option<String>,
    intercept: f64,
    coefficients: HashMap<String, f64>,
    #[serde(default)]
    means: HashMap<String, f64>,
    #[serde(default)]
    scales: HashMap<String, f64>,
}

/// Standardized logistic regression over the expected features
#[derive(Debug, Clone)]
pub struct LogisticModel {
    name: String,
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
    means: [f64; FEATURE_COUNT],
    scales: [f64; FEATURE_COUNT],
}

impl LogisticModel {
    /// Unstandardized model (means 0, scales 1)
    pub fn new(name: impl Into<String>, intercept: f64, coefficients: [f64; FEATURE_COUNT]) -> Self {
        Self {
            name: name.into(),
            intercept,
            coefficients,
            means: [0.0; FEATURE_COUNT],
            scales: [1.0; FEATURE_COUNT],
        }
    }

    /// Apply a fitted standard scaler before the linear term
    pub fn with_standardization(
        mut self,
        means: [f64; FEATURE_COUNT],
        scales: [f64; FEATURE_COUNT],
    ) -> Result<Self> {
        if let Some(i) = scales.iter().position(|s| !s.is_finite() || *s == 0.0) {
            anyhow::bail!("Scale for {} must be finite and non-zero", EXPECTED_COLUMNS[i]);
        }
        self.means = means;
        self.scales = scales;
        Ok(self)
    }

    /// Parse a JSON artifact
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: LogisticArtifact =
            serde_json::from_str(json).context("Failed to parse logistic model artifact")?;

        let unknown: Vec<&str> = artifact
            .coefficients
            .keys()
            .chain(artifact.means.keys())
            .chain(artifact.scales.keys())
            .map(String::as_str)
            .filter(|name| !EXPECTED_COLUMNS.contains(name))
            .collect();
        if !unknown.is_empty() {
            anyhow::bail!("Artifact names unknown features: {:?}", unknown);
        }

        let mut coefficients = [0.0; FEATURE_COUNT];
        let mut means = [0.0; FEATURE_COUNT];
        let mut scales = [1.0; FEATURE_COUNT];
        for (i, name) in EXPECTED_COLUMNS.iter().enumerate() {
            coefficients[i] = *artifact
                .coefficients
                .get(*name)
                .with_context(|| format!("Artifact has no coefficient for {name}"))?;
            if let Some(mean) = artifact.means.get(*name) {
                means[i] = *mean;
            }
            if let Some(scale) = artifact.scales.get(*name) {
                scales[i] = *scale;
            }
        }

        let name = artifact.name.unwrap_or_else(|| "Logistic Regression".to_string());
        Self::new(name, artifact.intercept, coefficients).with_standardization(means, scales)
    }

    /// Load a JSON artifact from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading logistic model");
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact {}", path.display()))?;
        Self::from_json(&json)
    }

    fn score(&self, features: &[f32]) -> f64 {
        let z = features
            .iter()
            .zip(self.coefficients.iter().zip(self.means.iter().zip(&self.scales)))
            .map(|(&x, (coef, (mean, scale)))| coef * (x as f64 - mean) / scale)
            .sum::<f64>()
            + self.intercept;
        1.0 / (1.0 + (-z).exp())
    }
}

impl FraudModel for LogisticModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict_proba(&self, data: &AlignedDataset) -> Result<Vec<f64>, InferenceError> {
        let matrix = feature_matrix(data)?;

        // No imputer in a bare linear model
        if let Some(pos) = matrix.iter().position(|v| v.is_nan()) {
            return Err(InferenceError::MissingValue {
                row: pos / FEATURE_COUNT + 1,
                column: EXPECTED_COLUMNS[pos % FEATURE_COUNT].to_string(),
            });
        }

        let probs: Vec<f64> = matrix.chunks(FEATURE_COUNT).map(|row| self.score(row)).collect();
        check_probabilities(data.len(), &probs)?;
        Ok(probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::validate_and_align;
    use crate::types::Dataset;

    fn aligned(rows: &[[&str; FEATURE_COUNT]]) -> AlignedDataset {
        let columns = EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect();
        validate_and_align(&Dataset::new(columns, rows).unwrap()).unwrap()
    }

    fn artifact_json(skip: Option<&str>) -> String {
        let coefficients: serde_json::Map<String, serde_json::Value> = EXPECTED_COLUMNS
            .iter()
            .filter(|c| Some(**c) != skip)
            .map(|c| (c.to_string(), serde_json::json!(0.5)))
            .collect();
        serde_json::json!({
            "name": "Smoke",
            "intercept": -1.0,
            "coefficients": coefficients,
            "means": {"Per1": 2.0},
            "scales": {"Per1": 4.0},
        })
        .to_string()
    }

    #[test]
    fn test_zero_model_is_coin_flip() {
        let model = LogisticModel::new("zero", 0.0, [0.0; FEATURE_COUNT]);
        let probs = model.predict_proba(&aligned(&[["3"; FEATURE_COUNT]])).unwrap();
        assert_eq!(probs, vec![0.5]);
    }

    #[test]
    fn test_from_json_applies_standardization() {
        let model = LogisticModel::from_json(&artifact_json(None)).unwrap();
        assert_eq!(model.name(), "Smoke");

        // Per1: 0.5 * (6 - 2) / 4 = 0.5; remaining 31 features are zero
        let mut row = ["0"; FEATURE_COUNT];
        row[0] = "6";
        let probs = model.predict_proba(&aligned(&[row])).unwrap();
        let expected = 1.0 / (1.0 + (0.5f64).exp());
        assert!((probs[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_from_json_requires_every_feature() {
        let err = LogisticModel::from_json(&artifact_json(Some("qsets_normalized_tat_max"))).unwrap_err();
        assert!(err.to_string().contains("qsets_normalized_tat_max"));
    }

    #[test]
    fn test_from_json_rejects_unknown_feature() {
        let json = serde_json::json!({
            "intercept": 0.0,
            "coefficients": {"TxnID": 1.0},
        })
        .to_string();
        assert!(LogisticModel::from_json(&json).is_err());
    }

    #[test]
    fn test_rejects_zero_scale() {
        let model = LogisticModel::new("m", 0.0, [1.0; FEATURE_COUNT]);
        assert!(model.with_standardization([0.0; FEATURE_COUNT], [0.0; FEATURE_COUNT]).is_err());
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let model = LogisticModel::new("m", 0.0, [1.0; FEATURE_COUNT]);
        let mut row = ["1"; FEATURE_COUNT];
        row[24] = "";
        let err = model.predict_proba(&aligned(&[["1"; FEATURE_COUNT], row])).unwrap_err();
        assert_eq!(
            err,
            InferenceError::MissingValue {
                row: 2,
                column: "Normalised_FNT".to_string()
            }
        );
    }

    #[test]
    fn test_deterministic() {
        let mut coefficients = [0.0; FEATURE_COUNT];
        for (i, c) in coefficients.iter_mut().enumerate() {
            *c = (i as f64 - 16.0) / 10.0;
        }
        let model = LogisticModel::new("m", 0.3, coefficients);
        let data = aligned(&[["0.25"; FEATURE_COUNT], ["-1.5"; FEATURE_COUNT]]);
        assert_eq!(model.predict_proba(&data).unwrap(), model.predict_proba(&data).unwrap());
    }
}
