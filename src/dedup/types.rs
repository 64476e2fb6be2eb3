// src/dedup/types.rs — Engine data types

use serde::{Deserialize, Serialize};

/// Monotonically increasing, never reused entry identifier.
pub type EntryId = i64;

/// An unordered pair of entries whose similarity met the threshold.
/// Always stored lower id first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityEdge {
    pub a: EntryId,
    pub b: EntryId,
    pub score: f32,
}

impl SimilarityEdge {
    /// Build an edge in canonical order. Returns `None` for a self-pair.
    pub fn new(x: EntryId, y: EntryId, score: f32) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(Self { a: x, b: y, score }),
            std::cmp::Ordering::Greater => Some(Self { a: y, b: x, score }),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// The slice of an entry the selector needs, plus a title for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMeta {
    pub id: EntryId,
    pub status: String,
    pub confidence: Option<f64>,
    pub title: Option<String>,
}

/// A set of entries connected through a chain of edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Sorted ascending.
    pub members: Vec<EntryId>,
    pub max_score: f32,
}

/// Decision for one cluster: `survivor` plus `to_delete` covers every
/// present member exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub survivor: EntryId,
    pub to_delete: Vec<EntryId>,
    pub max_score: f32,
    pub members: Vec<EntryMeta>,
    pub reason: String,
}

/// A new entry to write into the corpus (import and tests).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

fn default_status() -> String {
    "pending".into()
}
