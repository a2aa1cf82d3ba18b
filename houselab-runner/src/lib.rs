//! HouseLab Runner — run orchestration, reports and export.
//!
//! This crate builds on `houselab-core` to provide:
//! - TOML run configuration
//! - Data loading with file/synthetic fallback
//! - Memoized pipeline runs through an in-memory cache
//! - Hypothesis report (parallel) and map marker notes
//! - CSV, Parquet and JSON export
//! - Logging setup

pub mod cache;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod logging;
pub mod report;
pub mod runner;

pub use cache::MemoCache;
pub use config::{ConfigError, OutputFormat, RunConfig};
pub use data_loader::{load_listings, DataSource, LoadError, LoadedData};
pub use export::{
    export_listings_csv, export_recommendations, write_hypotheses, write_summary, ExportedTables,
    RunSummary,
};
pub use logging::{init_logging, LoggingError};
pub use report::{marker_notes, HypothesisReport, MarkerNote};
pub use runner::{run_from_config, run_from_data, RunError, RunOutcome};
