//! Tabular data as uploaded and as fed to the model

use crate::schema::EXPECTED_COLUMNS;

/// Uploaded table: header names plus raw string cells, one `Vec` per row.
///
/// Lives for one request only. Every row has exactly `columns().len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset from a header and rectangular rows.
    ///
    /// Returns `None` when any row's width differs from the header's.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Option<Self> {
        if rows.iter().any(|row| row.len() != columns.len()) {
            return None;
        }
        Some(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows (the header is not counted)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First `n` rows with the same header
    pub fn head(&self, n: usize) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Position of the first column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Upload projected onto the expected feature order.
///
/// Column `i` of every row is `EXPECTED_COLUMNS[i]`; row order is the upload's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedDataset {
    rows: Vec<Vec<String>>,
}

impl AlignedDataset {
    /// Only the schema validator constructs aligned data.
    pub(crate) fn from_aligned_rows(rows: Vec<Vec<String>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == EXPECTED_COLUMNS.len()));
        Self { rows }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &EXPECTED_COLUMNS
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
