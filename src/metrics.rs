//! Summary statistics for a prediction run.

use serde::Serialize;
use tracing::info;

/// Totals shown above the results table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionSummary {
    /// Rows scored
    pub total: usize,
    /// Rows labelled fraud
    pub fraud_count: usize,
    /// `fraud_count / total * 100`, or 0 for an empty upload
    pub fraud_pct: f64,
}

impl PredictionSummary {
    pub fn from_labels(labels: &[u8]) -> Self {
        let total = labels.len();
        let fraud_count = labels.iter().filter(|&&label| label == 1).count();
        let fraud_pct = if total > 0 {
            (fraud_count as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        Self {
            total,
            fraud_count,
            fraud_pct,
        }
    }

    /// Percentage with two decimals, e.g. `"12.50%"`
    pub fn fraud_pct_display(&self) -> String {
        format!("{:.2}%", self.fraud_pct)
    }

    pub fn log(&self, run_id: &str, threshold: f64) {
        info!(
            run_id = %run_id,
            total = self.total,
            fraud_count = self.fraud_count,
            fraud_pct = %self.fraud_pct_display(),
            threshold = threshold,
            "Prediction run complete"
        );
    }
}

/// Fraud-probability histogram over ten 0.1-wide buckets
pub fn score_distribution(probabilities: &[f64]) -> [usize; 10] {
    let mut buckets = [0; 10];
    for &p in probabilities {
        let bucket = (p * 10.0).min(9.0) as usize;
        buckets[bucket] += 1;
    }
    buckets
}
