//! Decision threshold: probability cutoff for the fraud label

use crate::error::ThresholdError;
use serde::Serialize;
use std::fmt;

/// Probability cutoff in `[0, 1]`. A row is labelled fraud when `p >= T`.
///
/// Raising `T` can only turn labels from 1 to 0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, ThresholdError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ThresholdError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Resolve a per-request override against the stored default.
    ///
    /// A missing or blank field keeps the default; the default itself is
    /// never modified.
    pub fn resolve(input: Option<&str>, default: Threshold) -> Result<Self, ThresholdError> {
        match input.map(str::trim) {
            None | Some("") => Ok(default),
            Some(raw) => {
                let value: f64 = raw
                    .parse()
                    .map_err(|_| ThresholdError::NotANumber(raw.to_string()))?;
                if value.is_nan() {
                    return Err(ThresholdError::NotANumber(raw.to_string()));
                }
                Self::new(value)
            }
        }
    }

    /// Binary label for one probability
    pub fn label(&self, probability: f64) -> u8 {
        u8::from(probability >= self.0)
    }

    /// Labels for a probability sequence, same order
    pub fn apply(&self, probabilities: &[f64]) -> Vec<u8> {
        probabilities.iter().map(|&p| self.label(p)).collect()
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
