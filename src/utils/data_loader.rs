//! Feature matrix loading from uploaded CSV files

use crate::error::{Result, ScreenError};
use ndarray::{Array2, ArrayView1};
use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Numeric feature table: one row per sample, one column per EEG feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if columns.len() != values.ncols() {
            return Err(ScreenError::ShapeError {
                expected: format!("{} columns", columns.len()),
                actual: format!("{} columns", values.ncols()),
            });
        }
        Ok(Self { columns, values })
    }

    /// Build a matrix from JSON-style rows, naming columns `f0..fn`
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        if n_rows == 0 {
            return Err(ScreenError::DataError("No rows submitted".to_string()));
        }
        let n_cols = rows[0].len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
            return Err(ScreenError::DataError(format!(
                "Row {} has {} values, row 1 has {}",
                i + 1,
                row.len(),
                n_cols
            )));
        }
        if rows.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ScreenError::DataError("Rows contain non-finite values".to_string()));
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let values = Array2::from_shape_vec((n_rows, n_cols), flat)?;
        let columns = (0..n_cols).map(|j| format!("f{}", j)).collect();
        Self::new(columns, values)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// First `n` rows for on-screen display
    pub fn preview(&self, n: usize) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.values.rows().into_iter().take(n)
    }
}

/// CSV loader for feature uploads.
///
/// Expects a header row and comma separated cells. Every column is read as
/// text and parsed per cell, so the type of a column never depends on how
/// many rows were sampled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataLoader;

impl DataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a CSV file from disk
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<FeatureMatrix> {
        let bytes = fs::read(path.as_ref())?;
        self.load_csv_bytes(&bytes)
    }

    /// Parse an uploaded CSV body
    pub fn load_csv_bytes(&self, bytes: &[u8]) -> Result<FeatureMatrix> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ScreenError::DataError("Uploaded file is empty".to_string()));
        }

        // A zero-length inference window reads every column as String
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_parse_options(CsvParseOptions::default().with_separator(b','))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        frame_to_matrix(&df)
    }
}

/// Parse one cell, ignoring surrounding whitespace
fn parse_cell(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Convert every column of a frame into one `f64` matrix.
/// Cells that do not parse as a finite number are rejected by column and row.
pub fn frame_to_matrix(df: &DataFrame) -> Result<FeatureMatrix> {
    let (n_rows, n_cols) = df.shape();
    if n_cols == 0 {
        return Err(ScreenError::DataError("CSV has no columns".to_string()));
    }
    if n_rows == 0 {
        return Err(ScreenError::DataError("CSV has no data rows".to_string()));
    }

    let mut values = Array2::<f64>::zeros((n_rows, n_cols));
    let mut columns = Vec::with_capacity(n_cols);

    for (j, column) in df.get_columns().iter().enumerate() {
        let name = column.name().trim().to_string();
        let series = column
            .as_materialized_series()
            .cast(&DataType::String)
            .map_err(|e| ScreenError::DataError(format!("Column '{}': {}", name, e)))?;
        let ca = series
            .str()
            .map_err(|e| ScreenError::DataError(format!("Column '{}': {}", name, e)))?;

        for (i, cell) in ca.into_iter().enumerate() {
            match parse_cell(cell) {
                Some(v) => values[[i, j]] = v,
                None => {
                    return Err(ScreenError::DataError(format!(
                        "Column '{}' row {}: missing or non-numeric value",
                        name,
                        i + 1
                    )))
                }
            }
        }
        columns.push(name);
    }

    FeatureMatrix::new(columns, values)
}
