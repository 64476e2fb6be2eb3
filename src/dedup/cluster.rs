// src/dedup/cluster.rs — Cluster assembly (disjoint-set union)

use std::collections::HashMap;

use super::types::{Cluster, EntryId, SimilarityEdge};

/// Union-find over entry ids: an explicit id -> parent map with path
/// compression on lookup. Roots are an internal detail and never leak out
/// as anything meaningful.
#[derive(Debug, Default)]
pub struct DisjointSet {
    parent: HashMap<EntryId, EntryId>,
}

impl DisjointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Representative of `x`'s set, registering `x` as a singleton if new.
    pub fn find(&mut self, x: EntryId) -> EntryId {
        let mut root = x;
        loop {
            let parent = *self.parent.entry(root).or_insert(root);
            if parent == root {
                break;
            }
            root = parent;
        }

        // Point every node on the path straight at the root.
        let mut node = x;
        while node != root {
            let next = self.parent[&node];
            self.parent.insert(node, root);
            node = next;
        }
        root
    }

    pub fn union(&mut self, a: EntryId, b: EntryId) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent.insert(rb, ra);
        }
    }

    /// Every registered id grouped by representative.
    pub fn groups(&mut self) -> HashMap<EntryId, Vec<EntryId>> {
        let ids: Vec<EntryId> = self.parent.keys().copied().collect();
        let mut groups: HashMap<EntryId, Vec<EntryId>> = HashMap::new();
        for id in ids {
            let root = self.find(id);
            groups.entry(root).or_default().push(id);
        }
        groups
    }
}

/// Merge edges into clusters of two or more entries.
///
/// The partition does not depend on edge order. Clusters come back sorted by
/// descending max score (ties: lowest member first), members ascending.
pub fn assemble_clusters(edges: &[SimilarityEdge]) -> Vec<Cluster> {
    let mut set = DisjointSet::new();
    for edge in edges {
        set.union(edge.a, edge.b);
    }

    let mut max_by_root: HashMap<EntryId, f32> = HashMap::new();
    for edge in edges {
        let root = set.find(edge.a);
        let best = max_by_root.entry(root).or_insert(edge.score);
        if edge.score > *best {
            *best = edge.score;
        }
    }

    let mut clusters: Vec<Cluster> = set
        .groups()
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(root, mut members)| {
            members.sort_unstable();
            Cluster {
                members,
                max_score: max_by_root.get(&root).copied().unwrap_or(0.0),
            }
        })
        .collect();

    clusters.sort_by(|x, y| {
        y.max_score
            .total_cmp(&x.max_score)
            .then_with(|| x.members[0].cmp(&y.members[0]))
    });
    clusters
}
