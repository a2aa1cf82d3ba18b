//! Serializable run configuration, read from TOML.
//!
//! Every section is optional; a missing section takes its defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use houselab_core::data::PreprocessConfig;
use houselab_core::recommend::{PricingRule, RoundingPolicy};
use houselab_core::PipelineConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub input: InputConfig,
    pub preprocess: PreprocessConfig,
    pub pricing: PricingConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// `.csv` or `.parquet` listing table.
    pub path: Option<PathBuf>,
    /// When non-zero and `path` is missing, run on this many synthetic rows.
    pub synthetic_rows: usize,
    pub synthetic_seed: u64,
}

/// Markups as plain numbers; converted to exact decimals on use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub below_target_markup: f64,
    pub at_or_above_target_markup: f64,
    pub rounding: RoundingPolicy,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            below_target_markup: 1.30,
            at_or_above_target_markup: 1.10,
            rounding: RoundingPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(format!("unknown output format '{other}' (expected csv or parquet)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
            format: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `houselab_core=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl RunConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(format!("serialize: {e}")))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline_config().map(|_| ())
    }

    /// The core pipeline configuration this run describes.
    pub fn pipeline_config(&self) -> Result<PipelineConfig, ConfigError> {
        let pricing = PricingRule::from_f64(
            self.pricing.below_target_markup,
            self.pricing.at_or_above_target_markup,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(PipelineConfig {
            preprocess: self.preprocess.clone(),
            pricing,
            rounding: self.pricing.rounding,
        })
    }
}
