//! Errors surfaced to the user by a prediction run
//!
//! Every failure on the request path ends up as one `PredictionError` whose
//! `Display` text is the single message shown on the page.

use thiserror::Error;

/// Uploaded header does not match the expected feature schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Duplicate columns: {}", .0.join(", "))]
    DuplicateColumns(Vec<String>),
}

/// Upload is not usable delimited text, or the form is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid CSV: {0}")]
    Csv(String),

    #[error("Uploaded file is not valid UTF-8 text")]
    Utf8,

    #[error("No columns to parse from file")]
    EmptyInput,

    #[error("Missing form field: {0}")]
    MissingField(String),

    #[error("Malformed form data: {0}")]
    Multipart(String),
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Csv(err.to_string())
    }
}

/// The model call failed for the aligned input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("Non-numeric value {value:?} in column {column} at row {row}")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Missing value in column {column} at row {row}")]
    MissingValue { row: usize, column: String },

    #[error("Model returned invalid probability {probability} for row {row}")]
    InvalidProbability { row: usize, probability: f64 },

    #[error("Model returned {actual} probabilities for {expected} rows")]
    RowCount { expected: usize, actual: usize },

    #[error("Model inference failed: {0}")]
    Backend(String),
}

/// Decision threshold rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("Threshold must be between 0.00 and 1.00, got {0}")]
    OutOfRange(f64),

    #[error("Threshold is not a number: {0:?}")]
    NotANumber(String),
}

/// Any failure of the run action
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Threshold(#[from] ThresholdError),

    #[error("Failed to write predictions: {0}")]
    Export(String),
}

/// Result type for the request path
pub type Result<T> = std::result::Result<T, PredictionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_names() {
        let err = SchemaError::MissingColumns(vec!["Cred3".to_string(), "Dem1".to_string()]);
        assert_eq!(err.to_string(), "Missing columns: Cred3, Dem1");
    }

    #[test]
    fn test_prediction_error_is_transparent() {
        let err: PredictionError = ParseError::EmptyInput.into();
        assert_eq!(err.to_string(), "No columns to parse from file");

        let err: PredictionError = InferenceError::NonNumeric {
            row: 2,
            column: "Per1".to_string(),
            value: "abc".to_string(),
        }
        .into();
        assert!(err.to_string().contains("Per1"));
        assert!(err.to_string().contains("row 2"));
    }
}
