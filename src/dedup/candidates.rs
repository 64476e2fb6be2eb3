// src/dedup/candidates.rs — Candidate pool loader

use tracing::info;

use super::types::EntryId;
use super::EntryStore;
use crate::infra::errors::DedupError;

/// Load the ids eligible for comparison: embedded entries, ascending,
/// optionally capped. Any storage failure is fatal for the run.
pub async fn load_candidates<S: EntryStore + ?Sized>(
    store: &S,
    limit: Option<usize>,
) -> Result<Vec<EntryId>, DedupError> {
    let mut ids = store
        .candidate_ids(limit)
        .await
        .map_err(|e| DedupError::CandidatePool {
            source: Box::new(e),
        })?;

    // The ascending order is a contract the graph builder relies on.
    ids.sort_unstable();
    ids.dedup();
    if let Some(limit) = limit {
        ids.truncate(limit);
    }

    info!(candidates = ids.len(), "Loaded candidate pool");
    Ok(ids)
}
