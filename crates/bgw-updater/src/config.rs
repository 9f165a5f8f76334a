//! Per-run update configuration
//!
//! An [`UpdateContext`] is built once from CLI input and passed by reference
//! into every job; it is never mutated after construction.

use serde::{Deserialize, Serialize};

/// Default batch size for partitioned parallel jobs
pub const DEFAULT_BATCH_SIZE: u64 = 2_000_000;

/// Immutable per-run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContext {
    /// SPARQL endpoint address as `hostname:port`
    pub base_url: String,
    /// Target database name
    pub db_name: String,
    /// Clear every target collection before any job starts
    pub wipe_data: bool,
    /// Hard row cap for unbatched whole-table jobs (`None` = no limit)
    pub limit: Option<u64>,
    /// Batch size for partitioned parallel jobs
    pub batch_size: u64,
    /// Run jobs as concurrent workers instead of sequentially
    pub parallel: bool,
}

impl UpdateContext {
    pub fn new(base_url: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            db_name: db_name.into(),
            wipe_data: false,
            limit: None,
            batch_size: DEFAULT_BATCH_SIZE,
            parallel: false,
        }
    }

    pub fn with_wipe(mut self, wipe: bool) -> Self {
        self.wipe_data = wipe;
        self
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
