//! The run action: validate, infer, threshold, summarize.

use crate::csv_io::{parse_csv, write_predictions};
use crate::error::Result;
use crate::metrics::PredictionSummary;
use crate::models::{FraudModel, Threshold};
use crate::schema::validate_and_align;
use crate::types::{Dataset, Prediction, FRAUD_PREDICTION_COLUMN, FRAUD_PROBABILITY_COLUMN};
use uuid::Uuid;

/// Outcome of one successful run over an upload
#[derive(Debug, Clone)]
pub struct PredictionRun {
    pub run_id: Uuid,
    /// The upload as parsed, every uploaded column
    pub dataset: Dataset,
    /// One per upload row, same order
    pub predictions: Vec<Prediction>,
    pub summary: PredictionSummary,
    pub threshold: Threshold,
}

impl PredictionRun {
    pub fn labels(&self) -> Vec<u8> {
        self.predictions.iter().map(|p| p.label).collect()
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.predictions.iter().map(|p| p.probability).collect()
    }

    /// First `limit` rows of the upload with the label and probability
    /// columns appended last.
    ///
    /// Upload columns already named like the appended ones are replaced.
    pub fn result_table(&self, limit: usize) -> Dataset {
        let keep: Vec<usize> = self
            .dataset
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_str() != FRAUD_PREDICTION_COLUMN && c.as_str() != FRAUD_PROBABILITY_COLUMN)
            .map(|(i, _)| i)
            .collect();

        let mut columns: Vec<String> = keep
            .iter()
            .map(|&i| self.dataset.columns()[i].clone())
            .collect();
        columns.push(FRAUD_PREDICTION_COLUMN.to_string());
        columns.push(FRAUD_PROBABILITY_COLUMN.to_string());

        let rows = self
            .dataset
            .rows()
            .iter()
            .zip(&self.predictions)
            .take(limit)
            .map(|(row, prediction)| {
                let mut out: Vec<String> = keep.iter().map(|&i| row[i].clone()).collect();
                out.push(prediction.label.to_string());
                out.push(format!("{:.4}", prediction.probability));
                out
            })
            .collect();

        // Every row was built from `columns`
        Dataset::new(columns, rows).unwrap_or_default()
    }

    /// The downloadable CSV: `Fraud_Prediction` only, upload row order
    pub fn download_csv(&self) -> Result<Vec<u8>> {
        write_predictions(&self.labels())
    }
}

/// Score an already parsed upload.
///
/// Schema validation happens before the model is touched; any failure
/// aborts the run with no partial output.
pub fn run_predictions(model: &dyn FraudModel, dataset: Dataset, threshold: Threshold) -> Result<PredictionRun> {
    let aligned = validate_and_align(&dataset)?;
    let probabilities = model.predict_proba(&aligned)?;
    let labels = threshold.apply(&probabilities);

    let predictions = probabilities
        .into_iter()
        .zip(labels.iter())
        .map(|(probability, &label)| Prediction { probability, label })
        .collect();

    let run = PredictionRun {
        run_id: Uuid::new_v4(),
        dataset,
        predictions,
        summary: PredictionSummary::from_labels(&labels),
        threshold,
    };
    run.summary.log(&run.run_id.to_string(), threshold.value());
    Ok(run)
}

/// Parse CSV text and score it
pub fn run_from_csv(model: &dyn FraudModel, csv_text: &str, threshold: Threshold) -> Result<PredictionRun> {
    let dataset = parse_csv(csv_text)?;
    run_predictions(model, dataset, threshold)
}
