//! Listing loading and data resolution for the runner.
//!
//! Fallback policy:
//! 1. If the configured file exists → read it (CSV or Parquet)
//! 2. If not and `synthetic_rows > 0` → generate synthetic listings (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only mode. Results produced on synthetic
//! data are tagged as such.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use houselab_core::data::{generate_listings, listings_from_frame, DataError, DataIngestor};
use houselab_core::domain::{DatasetHash, RawListing};
use houselab_core::fingerprint::dataset_hash;

use crate::config::InputConfig;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no input file configured (set [input] path or synthetic_rows)")]
    NoInput,

    #[error("input file '{0}' not found (set [input] synthetic_rows for synthetic data)")]
    NotFound(PathBuf),

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

/// Where the rows came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Synthetic { rows: usize, seed: u64 },
}

/// Result of loading listings, including provenance.
#[derive(Debug)]
pub struct LoadedData {
    pub rows: Vec<RawListing>,
    pub source: DataSource,
    /// BLAKE3 over all rows, for fingerprinting.
    pub dataset_hash: DatasetHash,
}

impl LoadedData {
    pub fn has_synthetic(&self) -> bool {
        matches!(self.source, DataSource::Synthetic { .. })
    }
}

/// Read a listing table from a CSV or Parquet file.
pub fn load_file(path: &Path) -> Result<Vec<RawListing>, DataError> {
    let df = DataIngestor::new().load(path)?;
    listings_from_frame(&df)
}

/// Load listings as configured, with the synthetic fallback.
pub fn load_listings(input: &InputConfig) -> Result<LoadedData, LoadError> {
    let (rows, source) = match &input.path {
        Some(path) if path.exists() => {
            let rows = load_file(path)?;
            (rows, DataSource::File(path.clone()))
        }
        _ if input.synthetic_rows > 0 => {
            warn!(
                rows = input.synthetic_rows,
                seed = input.synthetic_seed,
                "generating synthetic listings; results will be tagged as synthetic"
            );
            let rows = generate_listings(input.synthetic_rows, input.synthetic_seed);
            (
                rows,
                DataSource::Synthetic {
                    rows: input.synthetic_rows,
                    seed: input.synthetic_seed,
                },
            )
        }
        Some(path) => return Err(LoadError::NotFound(path.clone())),
        None => return Err(LoadError::NoInput),
    };

    let dataset_hash = dataset_hash(&rows);
    info!(rows = rows.len(), source = ?source, hash = %dataset_hash, "loaded listings");

    Ok(LoadedData {
        rows,
        source,
        dataset_hash,
    })
}
