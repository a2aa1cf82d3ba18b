use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash of an input table (BLAKE3, hex).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn from_hash(hash: &str) -> Self {
        Self(hash.to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Memoization key for a pipeline run: dataset hash + configuration hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub dataset_hash: DatasetHash,
    pub config_hash: String,
}

impl CacheKey {
    pub fn new(dataset_hash: DatasetHash, config_hash: impl Into<String>) -> Self {
        Self {
            dataset_hash,
            config_hash: config_hash.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.dataset_hash.0.get(..12).unwrap_or(&self.dataset_hash.0);
        let config = self.config_hash.get(..12).unwrap_or(&self.config_hash);
        write!(f, "{data}-{config}")
    }
}
