// src/dedup/executor.rs — Resolution executor (the only mutating stage)

use serde::Serialize;
use tracing::{debug, info, warn};

use super::types::{EntryId, Resolution};
use super::{CancelFlag, DedupOptions, EntryStore};

/// What the executor did. In a dry run only `planned` is non-zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionOutcome {
    /// Ids marked for deletion across all resolutions.
    pub planned: usize,
    /// Ids sent to the store, including those in failed batches.
    pub attempted: usize,
    pub deleted: usize,
    pub failed_batches: usize,
    pub failed_deletions: usize,
    /// Ids never sent because the run was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
    pub final_count: Option<u64>,
}

/// Apply resolutions: in a dry run nothing is touched; otherwise every
/// non-survivor is deleted in fixed-size batches.
///
/// A failed batch is logged and counted, then the next batch runs: deletes
/// are idempotent, so a re-run picks up whatever was missed. Cancellation
/// lets the in-flight batch finish and stops before the next one.
pub async fn execute<S: EntryStore + ?Sized>(
    store: &S,
    resolutions: &[Resolution],
    opts: &DedupOptions,
    cancel: &CancelFlag,
) -> ExecutionOutcome {
    let ids: Vec<EntryId> = resolutions
        .iter()
        .flat_map(|r| r.to_delete.iter().copied())
        .collect();
    let mut outcome = ExecutionOutcome {
        planned: ids.len(),
        ..Default::default()
    };

    if opts.dry_run {
        info!(planned = outcome.planned, "Dry run: no entries deleted");
        return outcome;
    }

    for (batch, chunk) in ids.chunks(opts.delete_batch_size.max(1)).enumerate() {
        if cancel.is_cancelled() {
            outcome.cancelled = true;
            outcome.skipped = outcome.planned - outcome.attempted;
            warn!(
                skipped = outcome.skipped,
                "Deletion cancelled, remaining batches not issued"
            );
            break;
        }

        outcome.attempted += chunk.len();
        match store.delete_by_ids(chunk).await {
            Ok(n) => {
                debug!(batch, requested = chunk.len(), deleted = n, "Delete batch done");
                outcome.deleted += n;
            }
            Err(e) => {
                warn!(batch, size = chunk.len(), error = %e, "Delete batch failed, continuing");
                outcome.failed_batches += 1;
                outcome.failed_deletions += chunk.len();
            }
        }
    }

    outcome.final_count = match store.count().await {
        Ok(n) => Some(n),
        Err(e) => {
            warn!(error = %e, "Could not re-count corpus after deletion");
            None
        }
    };

    info!(
        planned = outcome.planned,
        deleted = outcome.deleted,
        failed_batches = outcome.failed_batches,
        remaining = ?outcome.final_count,
        "Deletion finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::fake::FakeStore;
    use std::sync::atomic::Ordering;

    fn resolution(survivor: EntryId, to_delete: Vec<EntryId>) -> Resolution {
        Resolution {
            survivor,
            to_delete,
            max_score: 0.99,
            members: Vec::new(),
            reason: String::new(),
        }
    }

    fn live_opts(delete_batch_size: usize) -> DedupOptions {
        DedupOptions {
            dry_run: false,
            delete_batch_size,
            ..Default::default()
        }
    }

    fn store_with(n: EntryId) -> FakeStore {
        FakeStore::with(
            (1..=n)
                .map(|id| (id, "pending", None, Some(vec![1.0])))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let store = store_with(4);
        let plan = vec![resolution(1, vec![2, 3, 4])];
        let outcome = execute(&store, &plan, &DedupOptions::default(), &CancelFlag::new()).await;
        assert_eq!(outcome.planned, 3);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(store.delete_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_deletes_in_batches() {
        let store = store_with(6);
        let plan = vec![resolution(1, vec![2, 3]), resolution(4, vec![5, 6])];
        let outcome = execute(&store, &plan, &live_opts(3), &CancelFlag::new()).await;
        assert_eq!(store.delete_calls.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.deleted, 4);
        assert_eq!(outcome.final_count, Some(2));
        assert_eq!(store.ids(), vec![1, 4]);
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_abort() {
        let mut store = store_with(1_600);
        store.failing_deletes.insert(1);
        let plan = vec![resolution(1, (2..=1_501).collect())];

        let outcome = execute(&store, &plan, &live_opts(500), &CancelFlag::new()).await;

        assert_eq!(outcome.attempted, 1_500);
        assert_eq!(outcome.failed_batches, 1);
        assert_eq!(outcome.failed_deletions, 500);
        assert_eq!(outcome.deleted, outcome.attempted - 500);
        assert_eq!(outcome.final_count, Some(1_600 - 1_000));
    }

    #[tokio::test]
    async fn test_already_absent_ids_are_harmless() {
        let store = store_with(2);
        let plan = vec![resolution(1, vec![2, 99, 100])];
        let outcome = execute(&store, &plan, &live_opts(500), &CancelFlag::new()).await;
        assert_eq!(outcome.failed_batches, 0);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.final_count, Some(1));
    }

    #[tokio::test]
    async fn test_cancel_stops_new_batches() {
        let store = store_with(5);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let plan = vec![resolution(1, vec![2, 3, 4, 5])];
        let outcome = execute(&store, &plan, &live_opts(2), &cancel).await;
        assert!(outcome.cancelled);
        assert_eq!(outcome.skipped, 4);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(store.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_cancel_lets_in_flight_batch_finish() {
        let cancel = CancelFlag::new();
        let mut store = store_with(7);
        store.cancel_during_delete = Some(cancel.clone());
        let plan = vec![resolution(1, (2..=7).collect())];

        let outcome = execute(&store, &plan, &live_opts(2), &cancel).await;

        assert!(outcome.cancelled);
        assert_eq!(store.delete_calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.deleted, 2);
        assert_eq!(outcome.skipped, outcome.planned - 2);
        assert_eq!(outcome.skipped, 4);
        assert_eq!(outcome.final_count, Some(5));
        assert_eq!(store.ids(), vec![1, 4, 5, 6, 7]);
    }
}
