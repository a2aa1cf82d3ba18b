//! HouseLab CLI — recommendation, hypothesis and data commands.
//!
//! Commands:
//! - `recommend` — run the pipeline over a listing table and export buy/sell recommendations
//! - `hypotheses` — evaluate the twelve price hypotheses over the enriched table
//! - `synth` — write a synthetic listing table in the input column contract
//! - `schema` — print the input column contract

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use houselab_core::data::schema::NEIGHBORHOOD_COLUMNS;
use houselab_core::data::{generate_listings, AnomalyReport, ListingSchema, Severity};
use houselab_core::recommend::RoundingPolicy;
use houselab_runner::{
    export_listings_csv, export_recommendations, init_logging, marker_notes, run_from_config,
    write_hypotheses, write_summary, HypothesisReport, MemoCache, OutputFormat, RunConfig,
    RunOutcome, RunSummary,
};

#[derive(Parser)]
#[command(
    name = "houselab",
    about = "HouseLab CLI — real-estate listing recommendations"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and export recommendation tables.
    Recommend {
        /// Listing table (.csv or .parquet). Overrides [input] path in the config.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Rounding policy: exact, truncate_after_profit, truncate_before_profit.
        #[arg(long)]
        rounding: Option<RoundingPolicy>,

        /// Output directory. Overrides [output] dir.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Output format: csv or parquet. Overrides [output] format.
        #[arg(long)]
        format: Option<OutputFormat>,

        /// Print this many map marker notes for buy rows.
        #[arg(long, default_value_t = 0)]
        notes: usize,
    },
    /// Evaluate the price hypotheses and write hypotheses.csv.
    Hypotheses {
        /// Listing table (.csv or .parquet). Overrides [input] path in the config.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory. Overrides [output] dir.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write a synthetic listing table as CSV.
    Synth {
        /// Number of rows.
        #[arg(long, default_value_t = 1000)]
        rows: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Destination CSV file.
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the input column contract.
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend {
            input,
            config,
            rounding,
            output_dir,
            format,
            notes,
        } => {
            let mut run_config = load_config(config.as_deref(), input)?;
            if let Some(rounding) = rounding {
                run_config.pricing.rounding = rounding;
            }
            if let Some(dir) = output_dir {
                run_config.output.dir = dir;
            }
            if let Some(format) = format {
                run_config.output.format = format;
            }
            run_recommend(&run_config, notes)
        }
        Commands::Hypotheses {
            input,
            config,
            output_dir,
        } => {
            let mut run_config = load_config(config.as_deref(), input)?;
            if let Some(dir) = output_dir {
                run_config.output.dir = dir;
            }
            run_hypotheses(&run_config)
        }
        Commands::Synth { rows, seed, out } => run_synth(rows, seed, &out),
        Commands::Schema => {
            print_schema();
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, input: Option<PathBuf>) -> Result<RunConfig> {
    let mut config = match path {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };
    if input.is_some() {
        config.input.path = input;
    }
    if config.input.path.is_none() && config.input.synthetic_rows == 0 {
        bail!("one of --input or a config with [input] path / synthetic_rows is required");
    }
    init_logging(&config.logging.level)?;
    Ok(config)
}

fn run_recommend(config: &RunConfig, notes: usize) -> Result<()> {
    let cache = MemoCache::new();
    let outcome = run_from_config(config, &cache)?;
    let rounding = outcome.pipeline_config.rounding;

    print_summary(&outcome);

    let written = export_recommendations(
        &outcome.output.recommendations,
        rounding,
        &config.output.dir,
        config.output.format,
    )?;
    let summary_path = write_summary(&RunSummary::from_outcome(&outcome), &config.output.dir)?;
    debug!(summary = %summary_path.display(), "summary written");

    println!("Recommendations: {}", written.recommendations.display());
    println!("Buys:            {}", written.buys.display());
    println!("Summary:         {}", summary_path.display());

    let shown = marker_notes(&outcome.output.recommendations, rounding, notes);
    if !shown.is_empty() {
        println!();
        println!("--- Marker notes ---");
        for note in &shown {
            println!("[{}] ({:.4}, {:.4}) {}", note.id, note.lat, note.long, note.text);
        }
    }

    Ok(())
}

fn run_hypotheses(config: &RunConfig) -> Result<()> {
    let cache = MemoCache::new();
    let outcome = run_from_config(config, &cache)?;

    let report = HypothesisReport::compute(&outcome.output.enriched);
    let path = write_hypotheses(&report, &config.output.dir)?;

    println!();
    println!("=== Hypotheses ===");
    for line in report.summary_lines() {
        println!("{line}");
    }
    println!();
    println!(
        "Supported: {}  Refuted: {}  Inconclusive: {}",
        report.supported(),
        report.refuted(),
        report.evaluations.len() - report.supported() - report.refuted()
    );
    if outcome.has_synthetic {
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!("Report saved to: {}", path.display());
    Ok(())
}

fn run_synth(rows: usize, seed: u64, out: &Path) -> Result<()> {
    let listings = generate_listings(rows, seed);
    let csv = export_listings_csv(&listings)?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, csv).with_context(|| format!("failed to write {}", out.display()))?;
    println!("Wrote {rows} synthetic listings to {}", out.display());
    Ok(())
}

fn print_schema() {
    println!("{:<16} {}", "Column", "Kind");
    println!("{}", "-".repeat(40));
    for (name, kind) in ListingSchema::COLUMNS {
        println!("{:<16} {}", name, kind.describe());
    }
    println!();
    println!("Dropped at ingest: {}", NEIGHBORHOOD_COLUMNS.join(", "));
}

fn print_summary(outcome: &RunOutcome) {
    let stats = &outcome.output.stats;
    let table = &outcome.output.recommendations;

    println!();
    println!("=== Recommendation Result ===");
    println!("Dataset:        {}", &outcome.dataset_hash[..12]);
    println!("Input rows:     {}", stats.input_rows);
    println!("Outliers:       {}", stats.dropped_outliers);
    println!("Repeat sales:   {}", stats.dropped_duplicates);
    println!("Listings:       {}", table.len());
    println!("Buys:           {}", table.buy_count());
    println!(
        "Total profit:   US${}",
        table.total_profit().trunc()
    );
    println!("Rounding:       {}", outcome.pipeline_config.rounding);
    if outcome.has_synthetic {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    for anomaly in outcome
        .output
        .anomalies
        .iter()
        .filter(|a| a.severity == Severity::Warning)
    {
        println!("WARNING: {}", describe_anomaly(anomaly));
    }
    println!();
}

fn describe_anomaly(anomaly: &AnomalyReport) -> String {
    format!("{:?} ({} rows)", anomaly.anomaly_type, anomaly.count)
}
