//! HouseLab Core — listing pipeline, feature derivation and buy/sell recommendations.
//!
//! This crate contains the whole decision pipeline:
//! - Domain types (raw and validated listings, derived categories, recommendations)
//! - Input contract, ingestion and preprocessing (outliers, repeated sales)
//! - Per-row feature derivation
//! - Recommendation engine: region medians, seven-clause buy rule, high season, resale pricing
//! - Hypothesis aggregates H1–H12
//! - Fingerprinting and the memoization seam

pub mod data;
pub mod domain;
pub mod features;
pub mod fingerprint;
pub mod hypotheses;
pub mod pipeline;
pub mod recommend;

pub use pipeline::{run_pipeline, run_pipeline_cached, PipelineConfig, PipelineError, PipelineOutput};
