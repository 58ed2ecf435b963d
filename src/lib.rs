//! ATM Fraud Detection Library
//!
//! A single-page scoring form: upload a CSV of ATM transaction features,
//! validate it against the training schema, run the pre-trained stacking
//! classifier and download the binary fraud labels.

pub mod config;
pub mod csv_io;
pub mod error;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod types;
pub mod web;

pub use config::AppConfig;
pub use error::{InferenceError, ParseError, PredictionError, SchemaError, ThresholdError};
pub use models::{FraudModel, LogisticModel, Threshold};
pub use pipeline::{run_from_csv, run_predictions, PredictionRun};
pub use schema::{validate_and_align, EXPECTED_COLUMNS, FEATURE_COUNT};
pub use types::{AlignedDataset, Dataset, Prediction};
