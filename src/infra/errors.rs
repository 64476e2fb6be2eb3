// src/infra/errors.rs — Error types for kbdedup

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DedupError {
    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    // Fatal scan errors (abort before any mutation)
    #[error("Candidate pool could not be loaded: {source}")]
    CandidatePool {
        #[source]
        source: Box<DedupError>,
    },

    #[error("Similarity batch {batch} failed: {source}")]
    BatchFailed {
        batch: usize,
        #[source]
        source: Box<DedupError>,
    },

    #[error("Run cancelled before the similarity scan completed")]
    Cancelled,

    // User errors
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DedupError {
    /// Classify an error coming back from the SQLite store, keeping
    /// `rusqlite` failures typed.
    pub fn from_store(err: anyhow::Error) -> Self {
        match err.downcast::<rusqlite::Error>() {
            Ok(e) => DedupError::Database(e),
            Err(other) => DedupError::Other(other),
        }
    }

    /// Errors that abort a run outright. Everything else is either a per-batch
    /// deletion failure (counted, not propagated) or a caller mistake.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DedupError::CandidatePool { .. }
                | DedupError::BatchFailed { .. }
                | DedupError::StoreUnavailable(_)
                | DedupError::Cancelled
        )
    }
}
