//! Feature schema the trained pipeline expects.
//!
//! Uploads may name columns in any order and may carry extra columns; the
//! validator drops extras and reorders the rest to match training order.

use crate::error::SchemaError;
use crate::types::{AlignedDataset, Dataset};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// Feature columns in the order the model was trained on.
pub const EXPECTED_COLUMNS: [&str; 32] = [
    // Personal (9)
    "Per1",
    "Per2",
    "Per3",
    "Per4",
    "Per5",
    "Per6",
    "Per7",
    "Per8",
    "Per9",
    // Demographic (9)
    "Dem1",
    "Dem2",
    "Dem3",
    "Dem4",
    "Dem5",
    "Dem6",
    "Dem7",
    "Dem8",
    "Dem9",
    // Credit (6)
    "Cred1",
    "Cred2",
    "Cred3",
    "Cred4",
    "Cred5",
    "Cred6",
    // Aggregated scores (8)
    "Normalised_FNT",
    "geo_score_mean",
    "geo_score_max",
    "instance_score_mean",
    "instance_score_max",
    "lambda_wt",
    "qsets_normalized_tat_mean",
    "qsets_normalized_tat_max",
];

/// Number of model input features
pub const FEATURE_COUNT: usize = EXPECTED_COLUMNS.len();

/// Check `dataset` against the expected schema and project it onto it.
///
/// Duplicate header names fail first, then missing columns. Both errors list
/// names sorted. Extra columns are dropped without error. A header-only
/// upload aligns to an empty dataset.
pub fn validate_and_align(dataset: &Dataset) -> Result<AlignedDataset, SchemaError> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for column in dataset.columns() {
        *counts.entry(column.as_str()).or_insert(0) += 1;
    }

    let duplicates: Vec<String> = counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(name, _)| name.to_string())
        .collect();
    if !duplicates.is_empty() {
        return Err(SchemaError::DuplicateColumns(duplicates));
    }

    let missing: BTreeSet<&str> = EXPECTED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !counts.contains_key(name))
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns(
            missing.into_iter().map(String::from).collect(),
        ));
    }

    let expected: HashSet<&str> = EXPECTED_COLUMNS.iter().copied().collect();
    let extra: Vec<&str> = dataset
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|name| !expected.contains(name))
        .collect();
    if !extra.is_empty() {
        debug!(extra = ?extra, "Dropping columns not used by the model");
    }

    // Every expected column is present exactly once past the checks above.
    let indices: Vec<usize> = EXPECTED_COLUMNS
        .iter()
        .filter_map(|name| dataset.column_index(name))
        .collect();

    let rows = dataset
        .rows()
        .iter()
        .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
        .collect();

    Ok(AlignedDataset::from_aligned_rows(rows))
}
