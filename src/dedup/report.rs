// src/dedup/report.rs — Run summary and per-cluster listing

use serde::Serialize;
use std::fmt::Write as _;

use super::executor::ExecutionOutcome;
use super::types::{EntryId, EntryMeta, Resolution};
use super::DedupOptions;

#[derive(Debug, Clone, Serialize)]
pub struct RunParameters {
    pub threshold: f32,
    pub neighbors: usize,
    pub batch_size: usize,
    pub delete_batch_size: usize,
    pub max_scan: usize,
    pub dry_run: bool,
}

impl From<&DedupOptions> for RunParameters {
    fn from(o: &DedupOptions) -> Self {
        Self {
            threshold: o.threshold,
            neighbors: o.neighbors,
            batch_size: o.batch_size,
            delete_batch_size: o.delete_batch_size,
            max_scan: o.max_scan,
            dry_run: o.dry_run,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClusterReport {
    pub survivor: EntryId,
    pub to_delete: Vec<EntryId>,
    pub max_score: f32,
    pub reason: String,
    pub members: Vec<EntryMeta>,
}

impl From<&Resolution> for ClusterReport {
    fn from(r: &Resolution) -> Self {
        Self {
            survivor: r.survivor,
            to_delete: r.to_delete.clone(),
            max_score: r.max_score,
            reason: r.reason.clone(),
            members: r.members.clone(),
        }
    }
}

/// Everything an operator needs to review or audit a run.
#[derive(Debug, Clone, Serialize)]
pub struct DedupReport {
    pub parameters: RunParameters,
    pub initial_count: u64,
    pub scanned: usize,
    pub batches: usize,
    pub edges: usize,
    pub clusters: usize,
    pub vanished_clusters: usize,
    pub kept: usize,
    pub marked_for_deletion: usize,
    pub deleted: usize,
    pub failed_batches: usize,
    pub failed_deletions: usize,
    pub skipped_deletions: usize,
    pub cancelled: bool,
    pub final_count: Option<u64>,
    pub cluster_details: Vec<ClusterReport>,
}

impl DedupReport {
    /// Human-readable summary; the per-cluster listing is included in dry
    /// runs or when `details` is set.
    pub fn render_text(&self, details: bool) -> String {
        let mut out = String::new();
        let p = &self.parameters;
        let mode = if p.dry_run { "dry run" } else { "resolve" };
        let _ = writeln!(
            out,
            "Near-duplicate {mode} (threshold {:.2}, k={}, batch {})",
            p.threshold, p.neighbors, p.batch_size
        );
        let _ = writeln!(out, "  Entries:    {}", self.initial_count);
        let _ = writeln!(
            out,
            "  Scanned:    {} in {} batches",
            self.scanned, self.batches
        );
        let _ = writeln!(out, "  Edges:      {}", self.edges);
        let _ = writeln!(out, "  Clusters:   {}", self.clusters);
        if self.vanished_clusters > 0 {
            let _ = writeln!(
                out,
                "  Vanished:   {} (members gone since scan)",
                self.vanished_clusters
            );
        }
        let _ = writeln!(out, "  Kept:       {}", self.kept);
        let _ = writeln!(out, "  Marked:     {}", self.marked_for_deletion);

        if !p.dry_run {
            let _ = writeln!(out, "  Deleted:    {}", self.deleted);
            if self.failed_batches > 0 {
                let _ = writeln!(
                    out,
                    "  Failed:     {} batches ({} entries), safe to re-run",
                    self.failed_batches, self.failed_deletions
                );
            }
            if self.cancelled {
                let _ = writeln!(
                    out,
                    "  Cancelled:  {} entries not attempted",
                    self.skipped_deletions
                );
            }
            if let Some(n) = self.final_count {
                let _ = writeln!(out, "  Remaining:  {n}");
            }
        }

        if p.dry_run || details {
            for (i, c) in self.cluster_details.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "\n[{}] max similarity {:.3}, keep #{} ({})",
                    i + 1,
                    c.max_score,
                    c.survivor,
                    c.reason
                );
                for m in &c.members {
                    let marker = if m.id == c.survivor { "keep" } else { "drop" };
                    let confidence = m
                        .confidence
                        .map(|v| format!("{v:.2}"))
                        .unwrap_or_else(|| "-".into());
                    let _ = writeln!(
                        out,
                        "    {marker} #{:<8} {:<10} conf {:<5} {}",
                        m.id,
                        m.status,
                        confidence,
                        truncate(m.title.as_deref().unwrap_or(""), 60)
                    );
                }
            }
        }
        out
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn assemble_report(
    opts: &DedupOptions,
    initial_count: u64,
    scanned: usize,
    batches: usize,
    edges: usize,
    clusters: usize,
    vanished_clusters: usize,
    resolutions: &[Resolution],
    outcome: &ExecutionOutcome,
) -> DedupReport {
    DedupReport {
        parameters: RunParameters::from(opts),
        initial_count,
        scanned,
        batches,
        edges,
        clusters,
        vanished_clusters,
        kept: resolutions.len(),
        marked_for_deletion: outcome.planned,
        deleted: outcome.deleted,
        failed_batches: outcome.failed_batches,
        failed_deletions: outcome.failed_deletions,
        skipped_deletions: outcome.skipped,
        cancelled: outcome.cancelled,
        final_count: outcome.final_count,
        cluster_details: resolutions.iter().map(ClusterReport::from).collect(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
