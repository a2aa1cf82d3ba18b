use polars::prelude::*;
use std::path::Path;

use crate::data::schema::SchemaError;

/// Data ingestor for CSV and Parquet files
pub struct DataIngestor;

impl DataIngestor {
    pub fn new() -> Self {
        Self
    }

    /// Ingest CSV file. Types are inferred from every row, so a float that
    /// first shows up deep in the file still types its column.
    pub fn ingest_csv(&self, path: &Path) -> Result<LazyFrame, DataError> {
        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(None)
            .finish()
            .map_err(|e| DataError::IngestFailed(e.to_string()))
    }

    /// Ingest Parquet file
    pub fn ingest_parquet(&self, path: &Path) -> Result<LazyFrame, DataError> {
        LazyFrame::scan_parquet(path, Default::default())
            .map_err(|e| DataError::IngestFailed(e.to_string()))
    }

    /// Pick the reader from the file extension and collect the frame.
    pub fn load(&self, path: &Path) -> Result<DataFrame, DataError> {
        if !path.exists() {
            return Err(DataError::FileNotFound(path.display().to_string()));
        }
        let lazy = match path.extension().and_then(|e| e.to_str()) {
            Some("csv") => self.ingest_csv(path)?,
            Some("parquet") => self.ingest_parquet(path)?,
            other => {
                return Err(DataError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        lazy.collect()
            .map_err(|e| DataError::IngestFailed(e.to_string()))
    }
}

impl Default for DataIngestor {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Ingest failed: {0}")]
    IngestFailed(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file extension: {0} (expected csv or parquet)")]
    UnsupportedFormat(String),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Null value in column '{column}' at row {row}")]
    NullValue { column: String, row: usize },

    #[error("Listing {id}: malformed date '{value}'")]
    InvalidDate { id: i64, value: String },

    #[error("Listing {id}: malformed year {value} in column '{column}'")]
    InvalidYear {
        id: i64,
        column: &'static str,
        value: i64,
    },

    #[error("Listing {id}: invalid value {value} in column '{column}'")]
    InvalidValue {
        id: i64,
        column: &'static str,
        value: String,
    },
}
