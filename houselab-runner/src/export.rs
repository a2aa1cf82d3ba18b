//! Export — CSV and Parquet artifacts.
//!
//! - Recommendation and buy tables as CSV or Parquet (polars writers)
//! - Hypothesis report as CSV (one row per group)
//! - Raw listings as CSV, in the input column contract
//! - Run summary as JSON

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use houselab_core::data::{recommendations_to_frame, AnomalyReport, PreprocessStats};
use houselab_core::domain::{RawListing, RecommendationTable};
use houselab_core::recommend::RoundingPolicy;

use crate::config::OutputFormat;
use crate::report::{verdict_label, HypothesisReport};
use crate::runner::RunOutcome;

// ─── Frames ─────────────────────────────────────────────────────────

/// Write a frame to `path` in the given format.
pub fn write_frame(df: &mut DataFrame, path: &Path, format: OutputFormat) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    match format {
        OutputFormat::Csv => CsvWriter::new(file)
            .include_header(true)
            .finish(df)
            .with_context(|| format!("failed to write CSV {}", path.display())),
        OutputFormat::Parquet => ParquetWriter::new(file)
            .finish(df)
            .map(|_| ())
            .with_context(|| format!("failed to write Parquet {}", path.display())),
    }
}

/// Paths written by [`export_recommendations`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTables {
    pub recommendations: PathBuf,
    pub buys: PathBuf,
}

/// Write `recommendations.<ext>` (every row) and `buys.<ext>` (buy rows only)
/// under `dir`, creating it if needed.
pub fn export_recommendations(
    table: &RecommendationTable,
    rounding: RoundingPolicy,
    dir: &Path,
    format: OutputFormat,
) -> Result<ExportedTables> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let ext = format.extension();
    let recommendations = dir.join(format!("recommendations.{ext}"));
    let buys = dir.join(format!("buys.{ext}"));

    let mut all = recommendations_to_frame(table, rounding)
        .context("failed to build recommendation frame")?;
    write_frame(&mut all, &recommendations, format)?;

    let mut buy_rows = recommendations_to_frame(&table.buys_table(), rounding)
        .context("failed to build buy frame")?;
    write_frame(&mut buy_rows, &buys, format)?;

    Ok(ExportedTables {
        recommendations,
        buys,
    })
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Hypothesis report as CSV.
///
/// Columns: hypothesis, field, group, mean_price, count, observed, verdict,
/// statement. One row per group; hypothesis-level columns repeat.
pub fn export_hypotheses_csv(report: &HypothesisReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "hypothesis",
        "field",
        "group",
        "mean_price",
        "count",
        "observed",
        "verdict",
        "statement",
    ])?;

    for e in &report.evaluations {
        let observed = e.observed.map(|o| format!("{o:.4}")).unwrap_or_default();
        for g in &e.groups {
            let mean_price = format!("{:.2}", g.mean_price);
            let count = g.count.to_string();
            wtr.write_record([
                e.hypothesis.id(),
                e.hypothesis.field(),
                g.key.as_str(),
                mean_price.as_str(),
                count.as_str(),
                observed.as_str(),
                verdict_label(e.verdict),
                e.hypothesis.statement(),
            ])?;
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write `hypotheses.csv` under `dir`.
pub fn write_hypotheses(report: &HypothesisReport, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join("hypotheses.csv");
    fs::write(&path, export_hypotheses_csv(report)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Raw listings as CSV with the contract header.
pub fn export_listings_csv(rows: &[RawListing]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── JSON summary ───────────────────────────────────────────────────

/// Headline figures of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub created_at: DateTime<Utc>,
    pub dataset_hash: String,
    pub synthetic: bool,
    pub stats: PreprocessStats,
    pub anomalies: Vec<AnomalyReport>,
    pub listings: usize,
    pub buys: usize,
    /// Exact sum over buy rows.
    pub total_profit: Decimal,
    pub rounding: RoundingPolicy,
}

impl RunSummary {
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let table = &outcome.output.recommendations;
        Self {
            created_at: Utc::now(),
            dataset_hash: outcome.dataset_hash.clone(),
            synthetic: outcome.has_synthetic,
            stats: outcome.output.stats,
            anomalies: outcome.output.anomalies.clone(),
            listings: table.len(),
            buys: table.buy_count(),
            total_profit: table.total_profit(),
            rounding: outcome.pipeline_config.rounding,
        }
    }
}

pub fn export_summary_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).context("failed to serialize run summary to JSON")
}

/// Write `summary.json` under `dir`.
pub fn write_summary(summary: &RunSummary, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join("summary.json");
    fs::write(&path, export_summary_json(summary)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
