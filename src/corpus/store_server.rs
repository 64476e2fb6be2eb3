// src/corpus/store_server.rs — Async message passing for Store
//
// The SQLite connection is not Sync, so a single task owns the Store and
// serves requests from a channel. StoreHandle is the cloneable async face
// the dedup engine talks to.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::corpus::store::Store;
use crate::dedup::types::{EntryId, EntryMeta, NewEntry, SimilarityEdge};
use crate::dedup::EntryStore;
use crate::infra::errors::DedupError;

#[derive(Debug)]
pub enum StoreCommand {
    InsertEntry {
        entry: NewEntry,
        resp: oneshot::Sender<anyhow::Result<EntryId>>,
    },
    CandidateIds {
        limit: Option<usize>,
        resp: oneshot::Sender<anyhow::Result<Vec<EntryId>>>,
    },
    SimilarPairs {
        anchors: Vec<EntryId>,
        k: usize,
        threshold: f32,
        resp: oneshot::Sender<anyhow::Result<Vec<SimilarityEdge>>>,
    },
    FetchMetadata {
        ids: Vec<EntryId>,
        resp: oneshot::Sender<anyhow::Result<Vec<EntryMeta>>>,
    },
    DeleteByIds {
        ids: Vec<EntryId>,
        resp: oneshot::Sender<anyhow::Result<usize>>,
    },
    Count {
        resp: oneshot::Sender<anyhow::Result<u64>>,
    },
}

/// A handle to the Store that uses message passing.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<StoreCommand>,
}

impl StoreHandle {
    pub fn new(tx: mpsc::Sender<StoreCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<anyhow::Result<T>>) -> StoreCommand,
    ) -> Result<T, DedupError> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(make(resp_tx))
            .await
            .map_err(|_| DedupError::StoreUnavailable("store task has stopped".into()))?;
        let result = resp_rx
            .await
            .map_err(|_| DedupError::StoreUnavailable("store task dropped the reply".into()))?;
        result.map_err(DedupError::from_store)
    }

    pub async fn insert_entry(&self, entry: NewEntry) -> Result<EntryId, DedupError> {
        self.request(|resp| StoreCommand::InsertEntry { entry, resp })
            .await
    }
}

#[async_trait]
impl EntryStore for StoreHandle {
    async fn candidate_ids(&self, limit: Option<usize>) -> Result<Vec<EntryId>, DedupError> {
        self.request(|resp| StoreCommand::CandidateIds { limit, resp })
            .await
    }

    async fn similar_pairs(
        &self,
        anchors: &[EntryId],
        k: usize,
        threshold: f32,
    ) -> Result<Vec<SimilarityEdge>, DedupError> {
        let anchors = anchors.to_vec();
        self.request(|resp| StoreCommand::SimilarPairs {
            anchors,
            k,
            threshold,
            resp,
        })
        .await
    }

    async fn fetch_metadata(&self, ids: &[EntryId]) -> Result<Vec<EntryMeta>, DedupError> {
        let ids = ids.to_vec();
        self.request(|resp| StoreCommand::FetchMetadata { ids, resp })
            .await
    }

    async fn delete_by_ids(&self, ids: &[EntryId]) -> Result<usize, DedupError> {
        let ids = ids.to_vec();
        self.request(|resp| StoreCommand::DeleteByIds { ids, resp })
            .await
    }

    async fn count(&self) -> Result<u64, DedupError> {
        self.request(|resp| StoreCommand::Count { resp }).await
    }
}

/// Spawn the store server and return its handle.
pub fn spawn_store_server(store: Store) -> (StoreHandle, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(100);
    let handle = StoreHandle::new(tx);
    let join_handle = tokio::spawn(run_store_server(store, rx));
    (handle, join_handle)
}

/// The background task that owns the Store.
pub async fn run_store_server(store: Store, mut rx: mpsc::Receiver<StoreCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            StoreCommand::InsertEntry { entry, resp } => {
                let _ = resp.send(store.insert_entry(&entry));
            }
            StoreCommand::CandidateIds { limit, resp } => {
                let _ = resp.send(store.candidate_ids(limit));
            }
            StoreCommand::SimilarPairs {
                anchors,
                k,
                threshold,
                resp,
            } => {
                let _ = resp.send(store.similar_pairs(&anchors, k, threshold));
            }
            StoreCommand::FetchMetadata { ids, resp } => {
                let _ = resp.send(store.fetch_metadata(&ids));
            }
            StoreCommand::DeleteByIds { ids, resp } => {
                let _ = resp.send(store.delete_by_ids(&ids));
            }
            StoreCommand::Count { resp } => {
                let _ = resp.send(store.count());
            }
        }
    }
}
