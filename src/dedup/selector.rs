// src/dedup/selector.rs — Canonical survivor selection
//
// Priority, highest first:
//   1. lifecycle status rank
//   2. confidence (missing counts as 0)
//   3. lower id (the oldest record)
// Ids are unique, so two distinct members never compare equal.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{info, warn};

use super::types::{Cluster, EntryId, EntryMeta, Resolution};
use super::EntryStore;
use crate::infra::errors::DedupError;

/// Closed ranking of lifecycle statuses, best first. Matching ignores case;
/// a status not in the list ranks below all listed ones.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRanking {
    order: Vec<String>,
}

impl Default for StatusRanking {
    fn default() -> Self {
        Self::new(vec!["approved".into(), "pending".into(), "rejected".into()])
    }
}

impl StatusRanking {
    pub fn new(order: Vec<String>) -> Self {
        Self {
            order: order.into_iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Higher is better; unknown statuses get 0.
    pub fn rank(&self, status: &str) -> usize {
        let status = status.to_lowercase();
        self.order
            .iter()
            .position(|s| *s == status)
            .map(|idx| self.order.len() - idx)
            .unwrap_or(0)
    }
}

/// `Less` means `a` should survive over `b`.
pub fn compare_priority(a: &EntryMeta, b: &EntryMeta, ranking: &StatusRanking) -> Ordering {
    ranking
        .rank(&b.status)
        .cmp(&ranking.rank(&a.status))
        .then_with(|| {
            let ca = a.confidence.unwrap_or(0.0);
            let cb = b.confidence.unwrap_or(0.0);
            cb.total_cmp(&ca)
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Why `winner` beat `runner_up`, naming the deciding criterion.
fn explain(winner: &EntryMeta, runner_up: &EntryMeta, ranking: &StatusRanking) -> String {
    if ranking.rank(&winner.status) != ranking.rank(&runner_up.status) {
        return format!(
            "status '{}' outranks '{}'",
            winner.status, runner_up.status
        );
    }
    let cw = winner.confidence.unwrap_or(0.0);
    let cr = runner_up.confidence.unwrap_or(0.0);
    if cw.total_cmp(&cr) != Ordering::Equal {
        return format!("higher confidence ({cw:.2} vs {cr:.2})");
    }
    format!("oldest entry (id {} < {})", winner.id, runner_up.id)
}

/// Resolve one cluster against the metadata of its surviving members.
/// Returns `None` when fewer than two members still exist.
pub fn resolve_cluster(
    cluster: &Cluster,
    metadata: &HashMap<EntryId, EntryMeta>,
    ranking: &StatusRanking,
) -> Option<Resolution> {
    let mut members: Vec<EntryMeta> = cluster
        .members
        .iter()
        .filter_map(|id| metadata.get(id).cloned())
        .collect();
    if members.len() < 2 {
        return None;
    }

    members.sort_by(|a, b| compare_priority(a, b, ranking));
    let survivor = members[0].id;
    let reason = explain(&members[0], &members[1], ranking);
    let mut to_delete: Vec<EntryId> = members[1..].iter().map(|m| m.id).collect();
    to_delete.sort_unstable();

    // Report members in id order, independent of rank.
    members.sort_by_key(|m| m.id);

    Some(Resolution {
        survivor,
        to_delete,
        max_score: cluster.max_score,
        members,
        reason,
    })
}

/// Outcome of selection across all clusters.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub resolutions: Vec<Resolution>,
    /// Clusters skipped because members disappeared since the scan.
    pub vanished_clusters: usize,
}

/// Fetch metadata for every cluster member in one query and pick one
/// survivor per cluster. Cluster order is preserved.
pub async fn select_survivors<S: EntryStore + ?Sized>(
    store: &S,
    clusters: &[Cluster],
    ranking: &StatusRanking,
) -> Result<Selection, DedupError> {
    let ids: Vec<EntryId> = clusters
        .iter()
        .flat_map(|c| c.members.iter().copied())
        .collect();
    if ids.is_empty() {
        return Ok(Selection::default());
    }

    let metadata: HashMap<EntryId, EntryMeta> = store
        .fetch_metadata(&ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    let mut selection = Selection::default();
    for cluster in clusters {
        match resolve_cluster(cluster, &metadata, ranking) {
            Some(resolution) => selection.resolutions.push(resolution),
            None => {
                warn!(members = ?cluster.members, "Cluster members vanished, skipping");
                selection.vanished_clusters += 1;
            }
        }
    }

    info!(
        clusters = clusters.len(),
        resolved = selection.resolutions.len(),
        vanished = selection.vanished_clusters,
        "Survivors selected"
    );
    Ok(selection)
}
