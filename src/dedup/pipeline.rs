// src/dedup/pipeline.rs — End-to-end run: plan, then (maybe) execute

use tracing::info;

use super::candidates::load_candidates;
use super::cluster::assemble_clusters;
use super::executor::execute;
use super::graph::build_graph;
use super::report::{assemble_report, DedupReport};
use super::selector::{select_survivors, Selection};
use super::types::Cluster;
use super::{CancelFlag, DedupOptions, EntryStore};
use crate::infra::errors::DedupError;

/// A complete, not yet executed resolution plan.
#[derive(Debug, Clone)]
pub struct Plan {
    pub initial_count: u64,
    pub scanned: usize,
    pub batches: usize,
    pub edges: usize,
    pub clusters: Vec<Cluster>,
    pub selection: Selection,
}

/// Build the full plan. Every failure here is fatal and happens before any
/// entry is touched.
pub async fn plan<S: EntryStore + ?Sized>(
    store: &S,
    opts: &DedupOptions,
    cancel: &CancelFlag,
) -> Result<Plan, DedupError> {
    opts.validate()?;

    let initial_count = store
        .count()
        .await
        .map_err(|e| DedupError::CandidatePool {
            source: Box::new(e),
        })?;
    let candidates = load_candidates(store, opts.scan_limit()).await?;
    let graph = build_graph(store, &candidates, opts, cancel).await?;
    let clusters = assemble_clusters(&graph.edges);
    let selection = select_survivors(store, &clusters, &opts.status_ranking).await?;

    Ok(Plan {
        initial_count,
        scanned: candidates.len(),
        batches: graph.batches,
        edges: graph.edges.len(),
        clusters,
        selection,
    })
}

/// Run the whole pipeline and report. Deletion only starts once the plan is
/// complete; a dry run never mutates the store.
pub async fn run<S: EntryStore + ?Sized>(
    store: &S,
    opts: &DedupOptions,
    cancel: &CancelFlag,
) -> Result<DedupReport, DedupError> {
    let plan = plan(store, opts, cancel).await?;
    info!(
        scanned = plan.scanned,
        edges = plan.edges,
        clusters = plan.clusters.len(),
        dry_run = opts.dry_run,
        "Plan ready"
    );

    let outcome = execute(store, &plan.selection.resolutions, opts, cancel).await;

    Ok(assemble_report(
        opts,
        plan.initial_count,
        plan.scanned,
        plan.batches,
        plan.edges,
        plan.clusters.len(),
        plan.selection.vanished_clusters,
        &plan.selection.resolutions,
        &outcome,
    ))
}
