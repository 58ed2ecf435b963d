#![allow(dead_code)]

use atm_fraud_detection::{AlignedDataset, FraudModel, InferenceError, LogisticModel, EXPECTED_COLUMNS, FEATURE_COUNT};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Logistic model driven by `Per1` only: P = sigmoid(4 * (Per1 - 0.5))
pub fn per1_model() -> LogisticModel {
    let mut coefficients = [0.0; FEATURE_COUNT];
    coefficients[0] = 4.0;
    LogisticModel::new("Test Logistic", -2.0, coefficients)
}

/// Wraps a model and counts `predict_proba` calls
pub struct CountingModel<M> {
    pub inner: M,
    pub calls: AtomicUsize,
}

impl<M> CountingModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<M: FraudModel> FraudModel for CountingModel<M> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn predict_proba(&self, data: &AlignedDataset) -> Result<Vec<f64>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.predict_proba(data)
    }
}

/// CSV with `columns` as header; cells are `Per1` values for `Per1` and
/// `0` elsewhere, or `extra_value` for columns outside the schema.
pub fn csv_with_columns(columns: &[&str], per1_values: &[&str], extra_value: &str) -> String {
    let mut text = columns.join(",");
    text.push('\n');
    for per1 in per1_values {
        let cells: Vec<&str> = columns
            .iter()
            .map(|c| {
                if *c == "Per1" {
                    *per1
                } else if EXPECTED_COLUMNS.contains(c) {
                    "0"
                } else {
                    extra_value
                }
            })
            .collect();
        text.push_str(&cells.join(","));
        text.push('\n');
    }
    text
}

/// Full schema in training order
pub fn full_csv(per1_values: &[&str]) -> String {
    csv_with_columns(&EXPECTED_COLUMNS, per1_values, "")
}
