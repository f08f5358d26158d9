//! Store client seam
//!
//! [`StoreClient`] is the already-connected handle to one tenant's
//! document store. The facade never talks to a store any other way.
//! Connection setup, credentials, transport and timeouts all live behind
//! this trait.
//!
//! Live results travel over a [`Listener`]: an unbounded channel of
//! snapshots plus a release hook that deregisters the listener from the
//! store.

mod listener;

pub use listener::{Listener, ListenerSender};

use async_trait::async_trait;

use crate::errors::StoreResult;
use crate::model::{CollectionPath, Document, DocumentId};
use crate::query::QueryDescriptor;

/// Options for document writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Merge into the existing document instead of replacing it
    pub merge: bool,
}

impl SetOptions {
    pub fn merge() -> Self {
        Self { merge: true }
    }

    pub fn overwrite() -> Self {
        Self { merge: false }
    }
}

/// Handle to one tenant's document store
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Identifier of the backing project
    fn project_id(&self) -> &str;

    /// Executes a query once and returns matching payloads in result order
    async fn run_query(
        &self,
        collection: &CollectionPath,
        query: &QueryDescriptor,
    ) -> StoreResult<Vec<Document>>;

    /// Reads one document; `Ok(None)` when it does not exist
    async fn get_document(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
    ) -> StoreResult<Option<Document>>;

    /// Writes one document, creating it if absent
    async fn set_document(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
        data: Document,
        options: SetOptions,
    ) -> StoreResult<()>;

    /// Creates a document under a store-generated identifier
    async fn add_document(
        &self,
        collection: &CollectionPath,
        data: Document,
    ) -> StoreResult<DocumentId>;

    /// Deletes one document; absent documents are not an error
    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
    ) -> StoreResult<()>;

    /// Registers a live query. The store pushes the current result set and
    /// then a fresh one after every change to it.
    fn listen_query(
        &self,
        collection: &CollectionPath,
        query: &QueryDescriptor,
    ) -> StoreResult<Listener<Vec<Document>>>;

    /// Registers a live single-document watch. `None` means absent.
    fn listen_document(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
    ) -> StoreResult<Listener<Option<Document>>>;
}
