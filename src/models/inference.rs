//! Inference adapter: the trained classifier behind one batch call

use crate::error::InferenceError;
use crate::models::loader::LoadedModel;
use crate::schema::{EXPECTED_COLUMNS, FEATURE_COUNT};
use crate::types::AlignedDataset;
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::Mutex;
use tracing::debug;

/// A frozen, pre-trained binary classifier.
///
/// Loaded once per process and shared read-only. Identical input rows must
/// yield identical probabilities.
pub trait FraudModel: Send + Sync {
    /// Name shown to the user
    fn name(&self) -> &str;

    /// Probability of the fraud class for every row, in row order
    fn predict_proba(&self, data: &AlignedDataset) -> Result<Vec<f64>, InferenceError>;
}

/// Cell spellings read as a missing value (pandas' default NA set)
const MISSING_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A",
    "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || MISSING_TOKENS.contains(&cell)
}

/// Convert aligned string cells into a row-major `f32` matrix.
///
/// Empty cells and NA markers become NaN so that an imputing pipeline can
/// handle them; anything else that is not a number fails with the 1-based
/// row.
pub fn feature_matrix(data: &AlignedDataset) -> Result<Vec<f32>, InferenceError> {
    let mut matrix = Vec::with_capacity(data.len() * FEATURE_COUNT);

    for (row_idx, row) in data.rows().iter().enumerate() {
        for (column, cell) in EXPECTED_COLUMNS.iter().zip(row) {
            let cell = cell.trim();
            if is_missing(cell) {
                matrix.push(f32::NAN);
                continue;
            }
            let value: f32 = cell.parse().map_err(|_| InferenceError::NonNumeric {
                row: row_idx + 1,
                column: column.to_string(),
                value: cell.to_string(),
            })?;
            matrix.push(value);
        }
    }

    Ok(matrix)
}

/// Ensure the backend returned one finite probability in `[0, 1]` per row
pub fn check_probabilities(expected: usize, probabilities: &[f64]) -> Result<(), InferenceError> {
    if probabilities.len() != expected {
        return Err(InferenceError::RowCount {
            expected,
            actual: probabilities.len(),
        });
    }

    if let Some((row, &probability)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !(0.0..=1.0).contains(*p))
    {
        return Err(InferenceError::InvalidProbability {
            row: row + 1,
            probability,
        });
    }

    Ok(())
}

/// ONNX export of the trained pipeline, run through ONNX Runtime
pub struct OnnxModel {
    display_name: String,
    /// `Session::run` needs `&mut`, so the session sits behind a lock
    model: Mutex<LoadedModel>,
}

impl OnnxModel {
    pub fn new(model: LoadedModel, display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            model: Mutex::new(model),
        }
    }

    /// Run the whole batch as one `[rows, features]` tensor
    fn run_batch(model: &mut LoadedModel, features: Vec<f32>, rows: usize) -> Result<Vec<f64>, InferenceError> {
        use ort::value::Tensor;

        let shape = vec![rows as i64, FEATURE_COUNT as i64];
        let input_tensor = Tensor::from_array((shape, features))
            .map_err(|e| InferenceError::Backend(format!("Failed to create input tensor: {e}")))?;

        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input_tensor])
            .map_err(|e| InferenceError::Backend(e.to_string()))?;

        Self::extract_probabilities(&outputs, &model.output_name, &model.name, rows)
    }

    /// Extract fraud probabilities from the model outputs.
    ///
    /// Handles both tensor outputs (`[rows, classes]`) and the
    /// `seq(map(int64, float))` outputs emitted by sklearn-style converters.
    fn extract_probabilities(
        outputs: &ort::session::SessionOutputs,
        output_name: &str,
        model_name: &str,
        rows: usize,
    ) -> Result<Vec<f64>, InferenceError> {
        if let Some(output) = outputs.get(output_name) {
            if let Some(probs) = Self::extract_any(&output, model_name, rows) {
                return Ok(probs);
            }
        }

        // Fallback: first output that is not the label
        for (name, output) in outputs.iter() {
            if name.contains("label") {
                continue;
            }
            if let Some(probs) = Self::extract_any(&output, model_name, rows) {
                debug!(model = %model_name, output = %name, "Extracted probabilities (fallback)");
                return Ok(probs);
            }
        }

        Err(InferenceError::Backend(format!(
            "Model {model_name} produced no probability output"
        )))
    }

    fn extract_any(output: &ort::value::DynValue, model_name: &str, rows: usize) -> Option<Vec<f64>> {
        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            let probs = Self::fraud_column_from_tensor(&dims, data, rows);
            if probs.is_some() {
                debug!(model = %model_name, "Extracted from tensor");
            }
            return probs;
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            match Self::extract_from_sequence_map(output, rows) {
                Ok(probs) => return Some(probs),
                Err(e) => debug!(model = %model_name, error = %e, "seq(map) extraction failed"),
            }
        }

        None
    }

    /// Fraud-class column of a `[rows, classes]` (or `[rows]`) tensor
    fn fraud_column_from_tensor(dims: &[i64], data: &[f32], rows: usize) -> Option<Vec<f64>> {
        match dims {
            [n, classes] if *n == rows as i64 && *classes >= 1 && data.len() == rows * *classes as usize => {
                let classes = *classes as usize;
                // Single column means the tensor already is P(fraud)
                let col = if classes >= 2 { 1 } else { 0 };
                Some(
                    data.chunks(classes)
                        .map(|chunk| chunk[col] as f64)
                        .collect(),
                )
            }
            [n] if *n == rows as i64 && data.len() == rows => Some(data.iter().map(|&v| v as f64).collect()),
            _ => None,
        }
    }

    /// Probabilities from `seq(map(int64, float))`, one map per row
    fn extract_from_sequence_map(output: &ort::value::DynValue, rows: usize) -> anyhow::Result<Vec<f64>> {
        let allocator = Allocator::default();

        let sequence = output
            .downcast_ref::<DynSequenceValueType>()
            .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

        let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;
        if maps.len() != rows {
            anyhow::bail!("Sequence has {} maps for {} rows", maps.len(), rows);
        }

        let mut probs = Vec::with_capacity(rows);
        for map_value in &maps {
            let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

            let fraud = kv_pairs.iter().find(|(class_id, _)| *class_id == 1).map(|(_, p)| *p as f64);
            let legit = kv_pairs.iter().find(|(class_id, _)| *class_id == 0).map(|(_, p)| 1.0 - *p as f64);

            match fraud.or(legit) {
                Some(p) => probs.push(p),
                None => anyhow::bail!("No class probability found in map"),
            }
        }

        Ok(probs)
    }
}

impl FraudModel for OnnxModel {
    fn name(&self) -> &str {
        &self.display_name
    }

    fn predict_proba(&self, data: &AlignedDataset) -> Result<Vec<f64>, InferenceError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let features = feature_matrix(data)?;
        let mut model = self
            .model
            .lock()
            .map_err(|e| InferenceError::Backend(format!("Lock error: {}", e)))?;

        let probs = Self::run_batch(&mut model, features, data.len())?;
        check_probabilities(data.len(), &probs)?;

        debug!(model = %self.display_name, rows = data.len(), "Batch inference complete");
        Ok(probs)
    }
}
