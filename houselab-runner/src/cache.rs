//! In-memory result cache with hash-based deduplication.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use houselab_core::domain::CacheKey;
use houselab_core::pipeline::{PipelineCache, PipelineOutput};

/// Cache for pipeline outputs.
///
/// Results are keyed by [`CacheKey`] (content hash of rows and configuration)
/// and shared through `Arc`. Nothing is persisted.
#[derive(Debug, Default)]
pub struct MemoCache {
    entries: Mutex<HashMap<CacheKey, Arc<PipelineOutput>>>,
}

impl MemoCache {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoned locks are recovered: every write is a single map operation.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<PipelineOutput>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains_key(key)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<PipelineOutput>> {
        self.lock().get(key).cloned()
    }

    pub fn put(&self, key: CacheKey, output: Arc<PipelineOutput>) {
        self.lock().insert(key, output);
    }

    pub fn remove(&self, key: &CacheKey) -> Option<Arc<PipelineOutput>> {
        self.lock().remove(key)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PipelineCache for MemoCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<PipelineOutput>> {
        MemoCache::get(self, key)
    }

    fn put(&self, key: CacheKey, output: Arc<PipelineOutput>) {
        MemoCache::put(self, key, output)
    }
}
