// src/dedup/graph.rs — Similarity graph builder
//
// Each candidate is compared only against its top-K neighbours with a higher
// id, so cost grows linearly with the corpus. The trade-off: a true duplicate
// pair is missed when neither side has the other in its top-K.

use futures::future::join_all;
use tracing::{debug, info};

use super::types::{EntryId, SimilarityEdge};
use super::{CancelFlag, DedupOptions, EntryStore};
use crate::infra::errors::DedupError;

/// Edges found by one scan, plus how many storage queries it took.
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraph {
    pub edges: Vec<SimilarityEdge>,
    pub batches: usize,
}

/// Query the store batch by batch and collect every qualifying pair.
///
/// Up to `opts.concurrency` batches are in flight at once. Results are
/// appended in batch order, so the edge list does not depend on completion
/// order. A failed batch aborts the scan: acting on a partial graph would
/// under-report duplicates.
pub async fn build_graph<S: EntryStore + ?Sized>(
    store: &S,
    candidates: &[EntryId],
    opts: &DedupOptions,
    cancel: &CancelFlag,
) -> Result<SimilarityGraph, DedupError> {
    let batches: Vec<&[EntryId]> = candidates.chunks(opts.batch_size.max(1)).collect();
    let concurrency = opts.concurrency.max(1);
    let mut graph = SimilarityGraph {
        edges: Vec::new(),
        batches: batches.len(),
    };

    for (group_idx, group) in batches.chunks(concurrency).enumerate() {
        if cancel.is_cancelled() {
            info!(
                completed = group_idx * concurrency,
                total = batches.len(),
                "Similarity scan cancelled"
            );
            return Err(DedupError::Cancelled);
        }

        let first = group_idx * concurrency;
        let results = join_all(
            group
                .iter()
                .map(|batch| store.similar_pairs(batch, opts.neighbors, opts.threshold)),
        )
        .await;

        for (offset, result) in results.into_iter().enumerate() {
            let batch = first + offset;
            let found = result.map_err(|e| DedupError::BatchFailed {
                batch,
                source: Box::new(e),
            })?;
            debug!(
                batch,
                anchors = group[offset].len(),
                edges = found.len(),
                "Similarity batch done"
            );
            graph.edges.extend(found);
        }
    }

    info!(
        candidates = candidates.len(),
        batches = graph.batches,
        edges = graph.edges.len(),
        threshold = opts.threshold,
        "Similarity graph built"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::fake::FakeStore;
    use std::collections::HashSet;
    use std::sync::atomic::Ordering;

    fn five_entries() -> FakeStore {
        FakeStore::with(vec![
            (1, "approved", None, Some(vec![1.0, 0.0, 0.0])),
            (2, "approved", None, Some(vec![0.99, 0.05, 0.0])),
            (3, "approved", None, Some(vec![0.0, 1.0, 0.0])),
            (4, "approved", None, Some(vec![0.0, 0.98, 0.1])),
            (5, "approved", None, Some(vec![0.97, 0.1, 0.0])),
        ])
    }

    fn opts(batch_size: usize, threshold: f32) -> DedupOptions {
        DedupOptions {
            batch_size,
            threshold,
            ..Default::default()
        }
    }

    fn pairs(graph: &SimilarityGraph) -> Vec<(EntryId, EntryId)> {
        let mut p: Vec<_> = graph.edges.iter().map(|e| (e.a, e.b)).collect();
        p.sort();
        p
    }

    #[tokio::test]
    async fn test_batching_does_not_change_edges() {
        let cancel = CancelFlag::new();
        let ids = vec![1, 2, 3, 4, 5];

        let small = five_entries();
        let g_small = build_graph(&small, &ids, &opts(2, 0.9), &cancel)
            .await
            .unwrap();
        assert_eq!(g_small.batches, 3);
        assert_eq!(small.pair_queries.load(Ordering::SeqCst), 3);

        let whole = five_entries();
        let g_whole = build_graph(&whole, &ids, &opts(5, 0.9), &cancel)
            .await
            .unwrap();
        assert_eq!(g_whole.batches, 1);
        assert_eq!(pairs(&g_small), pairs(&g_whole));
        assert_eq!(pairs(&g_whole), vec![(1, 2), (1, 5), (2, 5), (3, 4)]);
    }

    #[tokio::test]
    async fn test_edges_monotonic_in_threshold() {
        let cancel = CancelFlag::new();
        let ids = vec![1, 2, 3, 4, 5];
        let store = five_entries();

        let mut previous: Option<HashSet<(EntryId, EntryId)>> = None;
        for t in [0.5, 0.9, 0.95, 0.99, 0.999] {
            let g = build_graph(&store, &ids, &opts(2, t), &cancel).await.unwrap();
            let current: HashSet<_> = pairs(&g).into_iter().collect();
            if let Some(lower) = &previous {
                assert!(current.is_subset(lower), "threshold {t} found new edges");
            }
            previous = Some(current);
        }
    }

    #[tokio::test]
    async fn test_edges_are_canonical_and_above_threshold() {
        let store = five_entries();
        let g = build_graph(&store, &[1, 2, 3, 4, 5], &opts(500, 0.95), &CancelFlag::new())
            .await
            .unwrap();
        assert!(!g.edges.is_empty());
        for e in &g.edges {
            assert!(e.a < e.b);
            assert!(e.score >= 0.95);
        }
    }

    #[tokio::test]
    async fn test_concurrency_preserves_result() {
        let ids = vec![1, 2, 3, 4, 5];
        let cancel = CancelFlag::new();
        let sequential = DedupOptions {
            concurrency: 1,
            ..opts(1, 0.9)
        };
        let parallel = DedupOptions {
            concurrency: 8,
            ..opts(1, 0.9)
        };
        let a = build_graph(&five_entries(), &ids, &sequential, &cancel)
            .await
            .unwrap();
        let b = build_graph(&five_entries(), &ids, &parallel, &cancel)
            .await
            .unwrap();
        assert_eq!(a.edges, b.edges);
    }

    #[tokio::test]
    async fn test_neighbor_cap_limits_edges_per_anchor() {
        let store = FakeStore::with(
            (1..=6)
                .map(|id| (id, "approved", None, Some(vec![1.0, 0.0])))
                .collect(),
        );
        let capped = DedupOptions {
            neighbors: 2,
            ..opts(10, 0.9)
        };
        let g = build_graph(&store, &[1, 2, 3, 4, 5, 6], &capped, &CancelFlag::new())
            .await
            .unwrap();
        for anchor in 1..=6 {
            assert!(g.edges.iter().filter(|e| e.a == anchor).count() <= 2);
        }
    }

    #[tokio::test]
    async fn test_failed_batch_is_fatal() {
        let mut store = five_entries();
        store.failing_pair_queries.insert(1);
        let err = build_graph(&store, &[1, 2, 3, 4, 5], &opts(2, 0.9), &CancelFlag::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DedupError::BatchFailed { batch: 1, .. }));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let store = five_entries();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = build_graph(&store, &[1, 2, 3], &opts(1, 0.9), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, DedupError::Cancelled));
        assert_eq!(store.pair_queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let store = five_entries();
        let g = build_graph(&store, &[], &opts(2, 0.9), &CancelFlag::new())
            .await
            .unwrap();
        assert_eq!(g.batches, 0);
        assert!(g.edges.is_empty());
    }
}
