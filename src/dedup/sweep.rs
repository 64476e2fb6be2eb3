// src/dedup/sweep.rs — Threshold comparison (read-only)
//
// Edge sets shrink monotonically as the threshold rises, so one scan at the
// lowest threshold serves every higher one by filtering.

use serde::Serialize;
use std::fmt::Write as _;
use tracing::info;

use super::candidates::load_candidates;
use super::cluster::assemble_clusters;
use super::graph::build_graph;
use super::types::SimilarityEdge;
use super::{CancelFlag, DedupOptions, EntryStore};
use crate::infra::errors::DedupError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub threshold: f32,
    pub edges: usize,
    pub clusters: usize,
    pub largest_cluster: usize,
    /// Entries a resolve at this threshold would delete.
    pub removable: usize,
}

/// Compare candidate thresholds without touching storage.
pub async fn sweep<S: EntryStore + ?Sized>(
    store: &S,
    opts: &DedupOptions,
    thresholds: &[f32],
    cancel: &CancelFlag,
) -> Result<Vec<SweepRow>, DedupError> {
    let mut thresholds = thresholds.to_vec();
    thresholds.sort_by(|a, b| a.total_cmp(b));
    thresholds.dedup();
    let Some(&lowest) = thresholds.first() else {
        return Ok(Vec::new());
    };

    let scan_opts = DedupOptions {
        threshold: lowest,
        dry_run: true,
        ..opts.clone()
    };
    scan_opts.validate()?;
    if let Some(bad) = thresholds.iter().find(|t| !(**t > 0.0 && **t < 1.0)) {
        return Err(DedupError::InvalidOptions(format!(
            "threshold must be in (0, 1), got {bad}"
        )));
    }

    let candidates = load_candidates(store, scan_opts.scan_limit()).await?;
    let graph = build_graph(store, &candidates, &scan_opts, cancel).await?;

    let rows: Vec<SweepRow> = thresholds
        .iter()
        .map(|&t| sweep_row(&graph.edges, t))
        .collect();

    info!(
        thresholds = rows.len(),
        base_edges = graph.edges.len(),
        "Threshold sweep finished"
    );
    Ok(rows)
}

fn sweep_row(edges: &[SimilarityEdge], threshold: f32) -> SweepRow {
    let kept: Vec<SimilarityEdge> = edges
        .iter()
        .filter(|e| e.score >= threshold)
        .copied()
        .collect();
    let clusters = assemble_clusters(&kept);
    SweepRow {
        threshold,
        edges: kept.len(),
        clusters: clusters.len(),
        largest_cluster: clusters.iter().map(|c| c.members.len()).max().unwrap_or(0),
        removable: clusters.iter().map(|c| c.members.len() - 1).sum(),
    }
}

/// Fixed-width table for terminal output.
pub fn render_table(rows: &[SweepRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>9}  {:>8}  {:>8}  {:>8}  {:>9}",
        "threshold", "edges", "clusters", "largest", "removable"
    );
    for r in rows {
        let _ = writeln!(
            out,
            "{:>9.2}  {:>8}  {:>8}  {:>8}  {:>9}",
            r.threshold, r.edges, r.clusters, r.largest_cluster, r.removable
        );
    }
    out
}
