// src/dedup/mod.rs — Near-duplicate detection and resolution engine
//
// Stages run strictly in order, each consuming only what the previous one
// produced:
//   candidates -> graph -> cluster -> selector -> executor
// Nothing is deleted until the whole plan exists.

pub mod candidates;
pub mod cluster;
pub mod executor;
pub mod graph;
pub mod pipeline;
pub mod report;
pub mod selector;
pub mod sweep;
pub mod types;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::infra::config::DedupConfig;
use crate::infra::errors::DedupError;
use selector::StatusRanking;
use types::{EntryId, EntryMeta, SimilarityEdge};

/// Storage capability the engine runs against.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Ids that carry an embedding, ascending, capped at `limit` when given.
    async fn candidate_ids(&self, limit: Option<usize>) -> Result<Vec<EntryId>, DedupError>;

    /// For each anchor, its `k` nearest neighbours with a higher id, keeping
    /// only pairs scoring at least `threshold`.
    async fn similar_pairs(
        &self,
        anchors: &[EntryId],
        k: usize,
        threshold: f32,
    ) -> Result<Vec<SimilarityEdge>, DedupError>;

    /// Metadata for the ids that still exist.
    async fn fetch_metadata(&self, ids: &[EntryId]) -> Result<Vec<EntryMeta>, DedupError>;

    /// Idempotent delete; returns how many rows actually went away.
    async fn delete_by_ids(&self, ids: &[EntryId]) -> Result<usize, DedupError>;

    async fn count(&self) -> Result<u64, DedupError>;
}

/// Parameters of a single run.
#[derive(Debug, Clone)]
pub struct DedupOptions {
    pub threshold: f32,
    /// Neighbours considered per entry (K). Duplicates can be missed when
    /// more than K near-duplicates crowd one entry's neighbourhood.
    pub neighbors: usize,
    pub batch_size: usize,
    pub delete_batch_size: usize,
    /// 0 = unbounded
    pub max_scan: usize,
    pub concurrency: usize,
    pub dry_run: bool,
    pub status_ranking: StatusRanking,
}

impl Default for DedupOptions {
    fn default() -> Self {
        Self::from_config(&DedupConfig::default(), true)
    }
}

impl DedupOptions {
    pub fn from_config(config: &DedupConfig, dry_run: bool) -> Self {
        Self {
            threshold: config.threshold,
            neighbors: config.neighbors,
            batch_size: config.batch_size,
            delete_batch_size: config.delete_batch_size,
            max_scan: config.max_scan,
            concurrency: config.concurrency,
            dry_run,
            status_ranking: StatusRanking::new(config.status_ranking.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), DedupError> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(DedupError::InvalidOptions(format!(
                "threshold must be in (0, 1), got {}",
                self.threshold
            )));
        }
        if self.batch_size == 0 || self.delete_batch_size == 0 {
            return Err(DedupError::InvalidOptions(
                "batch sizes must be positive".into(),
            ));
        }
        if self.neighbors == 0 {
            return Err(DedupError::InvalidOptions(
                "neighbors must be positive".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn scan_limit(&self) -> Option<usize> {
        (self.max_scan > 0).then_some(self.max_scan)
    }
}

/// Cooperative cancellation shared between the caller and a running engine.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
