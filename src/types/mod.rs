//! Type definitions for the fraud detection service

pub mod dataset;
pub mod prediction;

pub use dataset::{AlignedDataset, Dataset};
pub use prediction::{Prediction, FRAUD_PREDICTION_COLUMN, FRAUD_PROBABILITY_COLUMN};
