//! Result materializer
//!
//! Runs a built [`QueryDescriptor`] in one of two modes: fetch-once returns
//! a single [`ResultSet`], subscribe returns a cold [`Subscription`] that
//! yields a fresh `ResultSet` after every relevant change.
//!
//! Each call goes to the store independently. Nothing is cached or shared
//! between calls.

use std::sync::Arc;

use tracing::debug;

use crate::client::StoreClient;
use crate::errors::StoreResult;
use crate::model::{CollectionPath, Document};
use crate::observability::{log_store_failure, Event};
use crate::query::QueryDescriptor;
use crate::realtime::Subscription;

/// Document payloads in result order. Ids are not attached.
pub type ResultSet = Vec<Document>;

/// Executes descriptors against one store
#[derive(Clone)]
pub struct ResultMaterializer {
    client: Arc<dyn StoreClient>,
}

impl ResultMaterializer {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self { client }
    }

    pub fn project_id(&self) -> &str {
        self.client.project_id()
    }

    /// Executes the descriptor exactly once
    pub async fn fetch_once(
        &self,
        collection: &CollectionPath,
        query: &QueryDescriptor,
    ) -> StoreResult<ResultSet> {
        match self.client.run_query(collection, query).await {
            Ok(results) => {
                debug!(
                    event = %Event::QueryExecuted,
                    project = self.project_id(),
                    collection = %collection,
                    query = %query,
                    results = results.len()
                );
                Ok(results)
            }
            Err(err) => {
                log_store_failure(Event::QueryFailed, self.project_id(), collection.as_str(), &err);
                Err(err)
            }
        }
    }

    /// Creates a cold live query. The store is not contacted until the
    /// subscription is first polled.
    pub fn subscribe(
        &self,
        collection: &CollectionPath,
        query: &QueryDescriptor,
    ) -> Subscription<ResultSet> {
        let client = Arc::clone(&self.client);
        let target = collection.clone();
        let query = query.clone();
        Subscription::new(self.project_id(), collection.as_str(), move || {
            client.listen_query(&target, &query)
        })
    }
}
