//! Run orchestration — wires together configuration, loading and the
//! memoized pipeline.
//!
//! Two entry points:
//! - `run_from_config()`: loads listings as configured, then runs. Used by CLI.
//! - `run_from_data()`: takes pre-loaded listings. No I/O.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use houselab_core::pipeline::{run_pipeline_cached, PipelineCache, PipelineError, PipelineOutput};
use houselab_core::PipelineConfig;

use crate::config::{ConfigError, RunConfig};
use crate::data_loader::{load_listings, DataSource, LoadError, LoadedData};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("load error: {0}")]
    Load(#[from] LoadError),
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Result of one run, with provenance.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output: Arc<PipelineOutput>,
    pub pipeline_config: PipelineConfig,
    pub source: DataSource,
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Load listings as `config` describes and run the pipeline through `cache`.
pub fn run_from_config(
    config: &RunConfig,
    cache: &dyn PipelineCache,
) -> Result<RunOutcome, RunError> {
    let pipeline_config = config.pipeline_config()?;
    let loaded = load_listings(&config.input)?;
    run_from_data(loaded, &pipeline_config, cache)
}

/// Run the pipeline over pre-loaded listings.
pub fn run_from_data(
    loaded: LoadedData,
    pipeline_config: &PipelineConfig,
    cache: &dyn PipelineCache,
) -> Result<RunOutcome, RunError> {
    let has_synthetic = loaded.has_synthetic();
    let output = run_pipeline_cached(&loaded.rows, pipeline_config, cache)?;

    info!(
        rows = loaded.rows.len(),
        listings = output.recommendations.len(),
        buys = output.recommendations.buy_count(),
        synthetic = has_synthetic,
        "run complete"
    );

    Ok(RunOutcome {
        output,
        pipeline_config: pipeline_config.clone(),
        source: loaded.source,
        dataset_hash: loaded.dataset_hash.0,
        has_synthetic,
    })
}
