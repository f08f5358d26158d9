//! Document Accessor Tests
//!
//! Single-document operations:
//! - get fails NotFound for absent ids, exists reports false
//! - upsert merges and never drops untouched fields
//! - insert always creates, with a fresh id
//! - delete is idempotent
//! - watch follows one document through its lifecycle

use std::sync::Arc;

use duostore::{CollectionPath, Document, DocumentFacade, DocumentId, MemoryStore, StoreError};
use futures_util::StreamExt;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (Arc<MemoryStore>, DocumentFacade, CollectionPath) {
    let store = Arc::new(MemoryStore::new("projectTwo"));
    let facade = DocumentFacade::new(store.clone());
    (store, facade, CollectionPath::new("users"))
}

fn doc(value: serde_json::Value) -> Document {
    Document::from_json(value).unwrap()
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn test_get_missing_fails_not_found() {
    let (_store, facade, users) = setup();
    let err = facade
        .documents()
        .get(&users, &DocumentId::new("missing-id"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::not_found("users", "missing-id")
    );
}

#[tokio::test]
async fn test_exists_missing_is_false() {
    let (_store, facade, users) = setup();
    let exists = facade
        .documents()
        .exists(&users, &DocumentId::new("missing-id"))
        .await
        .unwrap();
    assert!(!exists);
}

#[tokio::test]
async fn test_read_failures_pass_through() {
    let (store, facade, users) = setup();
    store.deny("users");
    let err = facade
        .documents()
        .exists(&users, &DocumentId::new("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));
}

// =============================================================================
// Writes
// =============================================================================

/// Fields absent from the partial payload are left untouched.
#[tokio::test]
async fn test_upsert_merges_nested_fields() {
    let (_store, facade, users) = setup();
    let id = DocumentId::new("u1");
    let documents = facade.documents();

    documents
        .upsert(&users, &id, doc(json!({"name": "Ann", "prefs": {"theme": "dark", "lang": "en"}})))
        .await
        .unwrap();
    documents
        .upsert(&users, &id, doc(json!({"prefs": {"lang": "fr"}})))
        .await
        .unwrap();

    let stored = documents.get(&users, &id).await.unwrap();
    assert_eq!(
        stored,
        doc(json!({"name": "Ann", "prefs": {"theme": "dark", "lang": "fr"}}))
    );
}

#[tokio::test]
async fn test_insert_returns_fresh_ids() {
    let (_store, facade, users) = setup();
    let documents = facade.documents();

    let first = documents.insert(&users, doc(json!({"n": 1}))).await.unwrap();
    let second = documents.insert(&users, doc(json!({"n": 1}))).await.unwrap();
    assert_ne!(first, second);

    assert_eq!(documents.get(&users, &first).await.unwrap(), doc(json!({"n": 1})));
    assert_eq!(facade.fetch_all("users").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (_store, facade, users) = setup();
    let documents = facade.documents();
    let id = documents.insert(&users, doc(json!({"n": 1}))).await.unwrap();

    documents.delete(&users, &id).await.unwrap();
    documents.delete(&users, &id).await.unwrap();
    documents
        .delete(&users, &DocumentId::new("never-existed"))
        .await
        .unwrap();

    assert!(!documents.exists(&users, &id).await.unwrap());
}

#[tokio::test]
async fn test_writes_fail_when_unavailable() {
    let (store, facade, users) = setup();
    store.set_available(false);
    let err = facade
        .documents()
        .upsert(&users, &DocumentId::new("u1"), doc(json!({"a": 1})))
        .await
        .unwrap_err();
    assert!(err.is_unavailable());
}

// =============================================================================
// Watch
// =============================================================================

#[tokio::test]
async fn test_watch_lifecycle() {
    let (store, facade, users) = setup();
    let documents = facade.documents();
    let id = DocumentId::new("u1");

    let mut watch = documents.watch(&users, &id);
    assert_eq!(store.listener_count(), 0);
    assert_eq!(watch.next().await, Some(Ok(None)));

    documents
        .upsert(&users, &id, doc(json!({"name": "Ann"})))
        .await
        .unwrap();
    assert_eq!(watch.next().await, Some(Ok(Some(doc(json!({"name": "Ann"}))))));

    documents.delete(&users, &id).await.unwrap();
    assert_eq!(watch.next().await, Some(Ok(None)));

    watch.unsubscribe();
    assert_eq!(store.listener_count(), 0);
    assert_eq!(watch.next().await, None);
}

/// Writes to other documents do not wake the watch.
#[tokio::test]
async fn test_watch_ignores_other_documents() {
    let (_store, facade, users) = setup();
    let documents = facade.documents();
    let id = DocumentId::new("u1");
    documents.upsert(&users, &id, doc(json!({"v": 1}))).await.unwrap();

    let mut watch = documents.watch(&users, &id);
    assert_eq!(watch.next().await, Some(Ok(Some(doc(json!({"v": 1}))))));

    documents
        .upsert(&users, &DocumentId::new("u2"), doc(json!({"v": 9})))
        .await
        .unwrap();
    documents.upsert(&users, &id, doc(json!({"v": 2}))).await.unwrap();

    assert_eq!(watch.next().await, Some(Ok(Some(doc(json!({"v": 2}))))));
}
