//! Single-document access
//!
//! Independent of the query path. `get` turns absence into `NotFound`,
//! `exists` and `watch` report it as a value. `delete` is idempotent.

use std::sync::Arc;

use tracing::{debug, info};

use crate::client::{SetOptions, StoreClient};
use crate::errors::{StoreError, StoreResult};
use crate::model::{CollectionPath, Document, DocumentId};
use crate::observability::{log_store_failure, Event};
use crate::realtime::Subscription;

/// Read, write, watch and delete individual documents
#[derive(Clone)]
pub struct DocumentAccessor {
    client: Arc<dyn StoreClient>,
}

impl DocumentAccessor {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self { client }
    }

    fn project_id(&self) -> &str {
        self.client.project_id()
    }

    fn logged<T>(&self, collection: &CollectionPath, result: StoreResult<T>) -> StoreResult<T> {
        if let Err(err) = &result {
            log_store_failure(Event::DocumentFailed, self.project_id(), collection.as_str(), err);
        }
        result
    }

    /// Returns the document payload, or `NotFound`
    pub async fn get(&self, collection: &CollectionPath, id: &DocumentId) -> StoreResult<Document> {
        let result = self
            .client
            .get_document(collection, id)
            .await
            .and_then(|found| {
                found.ok_or_else(|| StoreError::not_found(collection.as_str(), id.as_str()))
            });
        if result.is_ok() {
            debug!(
                event = %Event::DocumentRead,
                project = self.project_id(),
                collection = %collection,
                id = %id
            );
        }
        self.logged(collection, result)
    }

    /// True if the document exists. Absence is not an error.
    pub async fn exists(&self, collection: &CollectionPath, id: &DocumentId) -> StoreResult<bool> {
        let result = self
            .client
            .get_document(collection, id)
            .await
            .map(|found| found.is_some());
        self.logged(collection, result)
    }

    /// Live view of one document; `None` snapshots mean it is absent
    pub fn watch(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
    ) -> Subscription<Option<Document>> {
        let client = Arc::clone(&self.client);
        let target_collection = collection.clone();
        let target_id = id.clone();
        Subscription::new(
            self.project_id(),
            format!("{}/{}", collection, id),
            move || client.listen_document(&target_collection, &target_id),
        )
    }

    /// Merges fields into the document, creating it if absent
    pub async fn upsert(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
        partial: Document,
    ) -> StoreResult<()> {
        let fields = partial.len();
        let result = self
            .client
            .set_document(collection, id, partial, SetOptions::merge())
            .await;
        if result.is_ok() {
            info!(
                event = %Event::DocumentWritten,
                project = self.project_id(),
                collection = %collection,
                id = %id,
                fields
            );
        }
        self.logged(collection, result)
    }

    /// Creates a document under a fresh store-generated id
    pub async fn insert(
        &self,
        collection: &CollectionPath,
        data: Document,
    ) -> StoreResult<DocumentId> {
        let result = self.client.add_document(collection, data).await;
        if let Ok(id) = &result {
            info!(
                event = %Event::DocumentWritten,
                project = self.project_id(),
                collection = %collection,
                id = %id
            );
        }
        self.logged(collection, result)
    }

    /// Removes the document. Deleting an absent document succeeds.
    pub async fn delete(&self, collection: &CollectionPath, id: &DocumentId) -> StoreResult<()> {
        let result = self.client.delete_document(collection, id).await;
        if result.is_ok() {
            info!(
                event = %Event::DocumentDeleted,
                project = self.project_id(),
                collection = %collection,
                id = %id
            );
        }
        self.logged(collection, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use futures_util::StreamExt;

    fn accessor() -> (Arc<MemoryStore>, DocumentAccessor) {
        let store = Arc::new(MemoryStore::new("projectOne"));
        (store.clone(), DocumentAccessor::new(store))
    }

    fn users() -> CollectionPath {
        CollectionPath::new("users")
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (_, docs) = accessor();
        let err = docs.get(&users(), &DocumentId::new("missing")).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!docs.exists(&users(), &DocumentId::new("missing")).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_merges() {
        let (_, docs) = accessor();
        let id = DocumentId::new("u1");
        docs.upsert(&users(), &id, Document::new().with("name", "Ann").with("age", 30))
            .await
            .unwrap();
        docs.upsert(&users(), &id, Document::new().with("age", 31))
            .await
            .unwrap();

        let stored = docs.get(&users(), &id).await.unwrap();
        assert_eq!(stored, Document::new().with("name", "Ann").with("age", 31));
    }

    #[tokio::test]
    async fn test_insert_then_delete_twice() {
        let (_, docs) = accessor();
        let id = docs
            .insert(&users(), Document::new().with("name", "Bo"))
            .await
            .unwrap();
        assert!(docs.exists(&users(), &id).await.unwrap());

        docs.delete(&users(), &id).await.unwrap();
        docs.delete(&users(), &id).await.unwrap();
        assert!(!docs.exists(&users(), &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_inserts_never_collide() {
        let (_, docs) = accessor();
        let a = docs.insert(&users(), Document::new()).await.unwrap();
        let b = docs.insert(&users(), Document::new()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_watch_sees_creation() {
        let (_, docs) = accessor();
        let id = DocumentId::new("u1");
        let mut watch = docs.watch(&users(), &id);
        assert_eq!(watch.next().await, Some(Ok(None)));

        docs.upsert(&users(), &id, Document::new().with("name", "Cy"))
            .await
            .unwrap();
        assert_eq!(
            watch.next().await,
            Some(Ok(Some(Document::new().with("name", "Cy"))))
        );
    }
}
