//! CSV parsing of uploads and writing of the prediction download

use crate::error::{ParseError, PredictionError};
use crate::types::{Dataset, FRAUD_PREDICTION_COLUMN};
use csv::{ReaderBuilder, Writer};

/// File name offered for the prediction download
pub const DOWNLOAD_FILE_NAME: &str = "atm_fraud_Final_values.csv";

/// Decode raw upload bytes as UTF-8 text
pub fn decode_upload(bytes: &[u8]) -> Result<String, ParseError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| ParseError::Utf8)
}

/// Parse comma-separated text with a header row.
///
/// Rows whose width differs from the header fail, as does input with no
/// header at all. A header with no data rows is a valid, empty dataset.
pub fn parse_csv(text: &str) -> Result<Dataset, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if columns.is_empty() || (columns.len() == 1 && columns[0].is_empty()) {
        return Err(ParseError::EmptyInput);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(String::from).collect());
    }

    Dataset::new(columns, rows)
        .ok_or_else(|| ParseError::Csv("rows have differing numbers of fields".to_string()))
}

/// Serialize labels as a single `Fraud_Prediction` column, no index
pub fn write_predictions(labels: &[u8]) -> Result<Vec<u8>, PredictionError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record([FRAUD_PREDICTION_COLUMN])
        .map_err(|e| PredictionError::Export(e.to_string()))?;

    for label in labels {
        writer
            .write_record([label.to_string()])
            .map_err(|e| PredictionError::Export(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| PredictionError::Export(e.to_string()))
}
