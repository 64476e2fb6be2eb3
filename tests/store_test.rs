// tests/store_test.rs — Integration test: SQLite corpus operations

use kbdedup::corpus::store::Store;
use kbdedup::corpus::Corpus;
use kbdedup::dedup::types::NewEntry;
use pretty_assertions::assert_eq;

fn entry(status: &str, confidence: Option<f64>, embedding: Option<Vec<f32>>) -> NewEntry {
    NewEntry {
        title: Some(format!("{status} entry")),
        content: "body".into(),
        status: status.into(),
        confidence,
        embedding,
    }
}

/// Create an in-memory corpus with schema applied.
fn test_store() -> Store {
    Corpus::in_memory().unwrap().store
}

#[test]
fn test_ids_increase_and_are_not_reused() {
    let store = test_store();
    let a = store.insert_entry(&entry("approved", None, None)).unwrap();
    let b = store.insert_entry(&entry("approved", None, None)).unwrap();
    assert!(b > a);

    store.delete_by_ids(&[b]).unwrap();
    let c = store.insert_entry(&entry("approved", None, None)).unwrap();
    assert!(c > b, "id {b} was reused");
}

#[test]
fn test_candidate_ids_only_embedded_and_ordered() {
    let store = test_store();
    let a = store
        .insert_entry(&entry("approved", None, Some(vec![1.0, 0.0])))
        .unwrap();
    store.insert_entry(&entry("approved", None, None)).unwrap();
    let c = store
        .insert_entry(&entry("pending", None, Some(vec![0.0, 1.0])))
        .unwrap();

    assert_eq!(store.candidate_ids(None).unwrap(), vec![a, c]);
    assert_eq!(store.candidate_ids(Some(0)).unwrap(), vec![a, c]);
    assert_eq!(store.candidate_ids(Some(1)).unwrap(), vec![a]);
}

#[test]
fn test_similar_pairs_uses_vector_distance() {
    let store = test_store();
    let a = store
        .insert_entry(&entry("approved", None, Some(vec![1.0, 0.0, 0.0])))
        .unwrap();
    let b = store
        .insert_entry(&entry("approved", None, Some(vec![0.99, 0.01, 0.0])))
        .unwrap();
    let c = store
        .insert_entry(&entry("approved", None, Some(vec![0.0, 1.0, 0.0])))
        .unwrap();

    let edges = store.similar_pairs(&[a, b, c], 5, 0.95).unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!((edges[0].a, edges[0].b), (a, b));
    assert!(edges[0].score > 0.99 && edges[0].score <= 1.0);

    // Only neighbours with a higher id are considered
    assert!(store.similar_pairs(&[b], 5, 0.95).unwrap().is_empty());
}

#[test]
fn test_similar_pairs_respects_k() {
    let store = test_store();
    let ids: Vec<i64> = (0..5)
        .map(|i| {
            store
                .insert_entry(&entry(
                    "approved",
                    None,
                    Some(vec![1.0, i as f32 * 0.01]),
                ))
                .unwrap()
        })
        .collect();

    let edges = store.similar_pairs(&ids[..1], 2, 0.9).unwrap();
    assert_eq!(edges.len(), 2);
    // Closest neighbours of the first entry come first
    assert_eq!(edges[0].b, ids[1]);
    assert_eq!(edges[1].b, ids[2]);
}

#[test]
fn test_fetch_metadata_omits_missing() {
    let store = test_store();
    let a = store
        .insert_entry(&entry("approved", Some(0.7), None))
        .unwrap();

    let meta = store.fetch_metadata(&[a, a + 50]).unwrap();
    assert_eq!(meta.len(), 1);
    assert_eq!(meta[0].status, "approved");
    assert_eq!(meta[0].confidence, Some(0.7));
    assert_eq!(meta[0].title.as_deref(), Some("approved entry"));
}

#[test]
fn test_delete_is_idempotent() {
    let store = test_store();
    let a = store.insert_entry(&entry("pending", None, None)).unwrap();
    let b = store.insert_entry(&entry("pending", None, None)).unwrap();

    assert_eq!(store.delete_by_ids(&[a]).unwrap(), 1);
    assert_eq!(store.delete_by_ids(&[a]).unwrap(), 0);
    assert_eq!(store.delete_by_ids(&[]).unwrap(), 0);
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.candidate_ids(None).unwrap(), Vec::<i64>::new());
    assert_eq!(store.fetch_metadata(&[b]).unwrap().len(), 1);
}

#[test]
fn test_empty_embedding_does_not_poison_similarity_scan() {
    let store = test_store();
    let a = store
        .insert_entry(&entry("approved", None, Some(vec![1.0, 0.0])))
        .unwrap();
    let b = store
        .insert_entry(&entry("pending", None, Some(vec![1.0, 0.0])))
        .unwrap();
    let empty = store
        .insert_entry(&entry("pending", None, Some(Vec::new())))
        .unwrap();
    // A zero-length blob written by some other tool
    store
        .conn()
        .execute(
            "INSERT INTO entries (content, status, embedding, created_at)
             VALUES ('legacy', 'pending', X'', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

    assert_eq!(store.count_embedded().unwrap(), 2);
    assert_eq!(store.candidate_ids(None).unwrap(), vec![a, b]);

    let edges = store.similar_pairs(&[a, b, empty], 5, 0.95).unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!((edges[0].a, edges[0].b), (a, b));
}

#[test]
fn test_file_backed_corpus_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("kb.db");
    {
        let corpus = Corpus::open(&path).unwrap();
        corpus
            .store
            .insert_entry(&entry("approved", None, Some(vec![1.0])))
            .unwrap();
    }
    let reopened = Corpus::open(&path).unwrap();
    assert_eq!(reopened.store.count().unwrap(), 1);
    assert_eq!(reopened.store.count_embedded().unwrap(), 1);
}
