//! Per-row model output

use serde::{Deserialize, Serialize};

/// Header of the binary label column, on screen and in the download
pub const FRAUD_PREDICTION_COLUMN: &str = "Fraud_Prediction";

/// Header of the probability column shown on screen
pub const FRAUD_PROBABILITY_COLUMN: &str = "Fraud_Probability";

/// Model output for one uploaded row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Estimated probability of the fraud class (0.0 - 1.0)
    pub probability: f64,
    /// 1 = fraud, 0 = legitimate
    pub label: u8,
}

impl Prediction {
    pub fn is_fraud(&self) -> bool {
        self.label == 1
    }
}
