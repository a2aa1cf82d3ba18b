//! The listing pipeline: preprocess → derive → recommend.
//!
//! One pure function of `(rows, config)`. Memoization goes through the
//! [`PipelineCache`] seam; the core itself keeps no state between runs.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::data::{
    AnomalyReport, Canonicalizer, DataError, PreprocessConfig, PreprocessStats, Severity,
};
use crate::domain::{CacheKey, EnrichedListing, RawListing, RecommendationTable, Zipcode};
use crate::features::FeatureDeriver;
use crate::fingerprint::cache_key;
use crate::recommend::{PricingError, PricingRule, RecommendError, RecommendationEngine, RoundingPolicy};

/// Everything a run depends on besides the rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    pub pricing: PricingRule,
    /// Presentation only; does not change [`PipelineOutput`].
    pub rounding: RoundingPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub stats: PreprocessStats,
    pub anomalies: Vec<AnomalyReport>,
    /// Step 2 table, sorted by id.
    pub enriched: Vec<EnrichedListing>,
    /// Same rows and order as `enriched`.
    pub recommendations: RecommendationTable,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("no median price for zipcode {0}")]
    MissingRegion(Zipcode),

    #[error("pricing error: {0}")]
    Pricing(#[from] PricingError),
}

impl From<RecommendError> for PipelineError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::MissingRegion(zipcode) => PipelineError::MissingRegion(zipcode),
            RecommendError::Pricing(e) => PipelineError::Pricing(e),
        }
    }
}

/// Run the whole pipeline over `rows`.
///
/// An empty input gives an empty table. Any malformed row aborts the run.
pub fn run_pipeline(
    rows: &[RawListing],
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    config.pricing.validate()?;

    let (listings, stats) = Canonicalizer::preprocess(rows, &config.preprocess)?;
    debug!(
        input = stats.input_rows,
        outliers = stats.dropped_outliers,
        duplicates = stats.dropped_duplicates,
        output = stats.output_rows,
        "preprocessed listings"
    );

    let anomalies = Canonicalizer::detect_anomalies(&listings, &stats);
    for anomaly in &anomalies {
        match anomaly.severity {
            Severity::Warning => warn!(kind = ?anomaly.anomaly_type, count = anomaly.count, "data anomaly"),
            Severity::Info => debug!(kind = ?anomaly.anomaly_type, count = anomaly.count, "data anomaly"),
        }
    }

    let enriched = FeatureDeriver::enrich_all(listings);
    let recommendations = RecommendationEngine::new(&config.pricing).run(enriched.clone())?;

    info!(
        listings = recommendations.len(),
        buys = recommendations.buy_count(),
        total_profit = %recommendations.total_profit(),
        "pipeline complete"
    );

    Ok(PipelineOutput {
        stats,
        anomalies,
        enriched,
        recommendations,
    })
}

/// Memoization seam for pipeline runs.
pub trait PipelineCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Arc<PipelineOutput>>;
    fn put(&self, key: CacheKey, output: Arc<PipelineOutput>);
}

/// A cache that never hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl PipelineCache for NoCache {
    fn get(&self, _key: &CacheKey) -> Option<Arc<PipelineOutput>> {
        None
    }

    fn put(&self, _key: CacheKey, _output: Arc<PipelineOutput>) {}
}

/// [`run_pipeline`], memoized on the content of `rows` and `config`.
pub fn run_pipeline_cached(
    rows: &[RawListing],
    config: &PipelineConfig,
    cache: &dyn PipelineCache,
) -> Result<Arc<PipelineOutput>, PipelineError> {
    let key = cache_key(rows, config);
    if let Some(hit) = cache.get(&key) {
        debug!(key = %key, "pipeline cache hit");
        return Ok(hit);
    }

    let output = Arc::new(run_pipeline(rows, config)?);
    cache.put(key, Arc::clone(&output));
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::generate_listings;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingCache {
        entries: Mutex<HashMap<CacheKey, Arc<PipelineOutput>>>,
        puts: Mutex<usize>,
    }

    impl PipelineCache for CountingCache {
        fn get(&self, key: &CacheKey) -> Option<Arc<PipelineOutput>> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        fn put(&self, key: CacheKey, output: Arc<PipelineOutput>) {
            *self.puts.lock().unwrap() += 1;
            self.entries.lock().unwrap().insert(key, output);
        }
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let output = run_pipeline(&[], &PipelineConfig::default()).unwrap();
        assert!(output.recommendations.is_empty());
        assert!(output.enriched.is_empty());
        assert_eq!(output.stats, PreprocessStats::default());
    }

    #[test]
    fn same_input_same_output() {
        let rows = generate_listings(300, 11);
        let config = PipelineConfig::default();
        assert_eq!(
            run_pipeline(&rows, &config).unwrap(),
            run_pipeline(&rows, &config).unwrap()
        );
    }

    #[test]
    fn malformed_row_aborts() {
        let mut rows = generate_listings(10, 11);
        rows[6].date = "13/10/2014".into();
        assert!(matches!(
            run_pipeline(&rows, &PipelineConfig::default()),
            Err(PipelineError::Data(DataError::InvalidDate { .. }))
        ));
    }

    #[test]
    fn invalid_markup_is_rejected_before_running() {
        let config = PipelineConfig {
            pricing: PricingRule {
                below_target_markup: Decimal::new(95, 2),
                ..PricingRule::default()
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(
            run_pipeline(&generate_listings(10, 1), &config),
            Err(PipelineError::Pricing(PricingError::MarkupBelowOne(_)))
        ));
    }

    #[test]
    fn cached_run_computes_once() {
        let rows = generate_listings(100, 5);
        let config = PipelineConfig::default();
        let cache = CountingCache::default();

        let first = run_pipeline_cached(&rows, &config, &cache).unwrap();
        let second = run_pipeline_cached(&rows, &config, &cache).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*cache.puts.lock().unwrap(), 1);

        let mut changed = rows.clone();
        changed[0].price += 1.0;
        let third = run_pipeline_cached(&changed, &config, &cache).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(*cache.puts.lock().unwrap(), 2);
    }

    #[test]
    fn no_cache_always_recomputes() {
        let rows = generate_listings(20, 5);
        let config = PipelineConfig::default();
        let a = run_pipeline_cached(&rows, &config, &NoCache).unwrap();
        let b = run_pipeline_cached(&rows, &config, &NoCache).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a, b);
    }
}
