//! Run fingerprinting: deterministic identity of a pipeline input.
//!
//! - `dataset_hash`: BLAKE3 over every input row, in input order.
//! - `config_hash`: BLAKE3 over the pipeline configuration.
//! - `cache_key`: both together, the memoization key.

use crate::domain::{CacheKey, DatasetHash, RawListing};
use crate::pipeline::PipelineConfig;

/// Hash every field of every row.
///
/// Row order is part of the identity: duplicates with equal `(id, date)` are
/// resolved by position, so reordering can change the output.
pub fn dataset_hash(rows: &[RawListing]) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(rows.len() as u64).to_le_bytes());

    for row in rows {
        hasher.update(&row.id.to_le_bytes());
        hasher.update(&(row.date.len() as u64).to_le_bytes());
        hasher.update(row.date.as_bytes());
        hasher.update(&row.price.to_le_bytes());
        hasher.update(&row.bedrooms.to_le_bytes());
        hasher.update(&row.bathrooms.to_le_bytes());
        hasher.update(&row.sqft_living.to_le_bytes());
        hasher.update(&row.sqft_lot.to_le_bytes());
        hasher.update(&row.floors.to_le_bytes());
        hasher.update(&row.waterfront.to_le_bytes());
        hasher.update(&row.condition.to_le_bytes());
        hasher.update(&row.sqft_basement.to_le_bytes());
        hasher.update(&row.yr_built.to_le_bytes());
        hasher.update(&row.yr_renovated.to_le_bytes());
        hasher.update(&row.zipcode.to_le_bytes());
        hasher.update(&row.lat.to_le_bytes());
        hasher.update(&row.long.to_le_bytes());
    }

    DatasetHash::from_hash(hasher.finalize().to_hex().as_str())
}

pub fn config_hash(config: &PipelineConfig) -> String {
    let mut hasher = blake3::Hasher::new();

    let mut outliers = config.preprocess.outlier_bedrooms.clone();
    outliers.sort_unstable();
    outliers.dedup();
    hasher.update(b"outlier_bedrooms");
    for bedrooms in outliers {
        hasher.update(&bedrooms.to_le_bytes());
    }

    // Normalized so that 1.3 and 1.30 hash the same.
    hasher.update(b"below_target_markup");
    hasher.update(config.pricing.below_target_markup.normalize().to_string().as_bytes());
    hasher.update(b"at_or_above_target_markup");
    hasher.update(
        config
            .pricing
            .at_or_above_target_markup
            .normalize()
            .to_string()
            .as_bytes(),
    );

    hasher.finalize().to_hex().to_string()
}

/// Memoization key for running `config` over `rows`.
pub fn cache_key(rows: &[RawListing], config: &PipelineConfig) -> CacheKey {
    CacheKey::new(dataset_hash(rows), config_hash(config))
}
