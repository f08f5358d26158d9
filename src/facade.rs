//! # Document Facade
//!
//! The public surface for one tenant store: one named operation per
//! combination of predicate count, ordering, limit, range and mode.
//!
//! | Shape | Predicates | Fetch-once | Subscribe |
//! |---|---|---|---|
//! | all | - | `fetch_all` | `subscribe_all` |
//! | sorted | - | `fetch_all_sorted` | `subscribe_all_sorted` |
//! | filtered | 1..=3 | `fetch_all_filtered` | `subscribe_all_filtered` |
//! | filtered + sorted | 1..=3 | `fetch_filtered_sorted` | `subscribe_filtered_sorted` |
//! | sorted + limited | - | `fetch_sorted_limited` | `subscribe_sorted_limited` |
//! | filtered + sorted + limited | 0..=3 | `fetch_filtered_sorted_limited` | `subscribe_filtered_sorted_limited` |
//! | filtered + range + sorted | 0..=1 | `fetch_filtered_sorted_range` | `subscribe_filtered_sorted_range` |
//! | filtered + range + sorted + limited | 0..=1 | `fetch_filtered_sorted_range_limited` | `subscribe_filtered_sorted_range_limited` |
//! | any descriptor | - | `fetch` | `subscribe` |
//!
//! Shape violations (wrong predicate count, zero limit) are `QueryRejected`.
//! Fetch-once operations return them directly; subscribe operations deliver
//! them as the terminal item of the returned subscription.

use std::sync::Arc;

use crate::client::StoreClient;
use crate::documents::DocumentAccessor;
use crate::errors::{StoreError, StoreResult};
use crate::materializer::{ResultMaterializer, ResultSet};
use crate::model::CollectionPath;
use crate::query::{OrderSpec, Predicate, PredicateChain, QueryBuilder, QueryDescriptor, RangeSpec};
use crate::realtime::Subscription;

/// Named query and document operations against one store
#[derive(Clone)]
pub struct DocumentFacade {
    materializer: ResultMaterializer,
    documents: DocumentAccessor,
}

impl DocumentFacade {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self {
            materializer: ResultMaterializer::new(Arc::clone(&client)),
            documents: DocumentAccessor::new(client),
        }
    }

    pub fn project_id(&self) -> &str {
        self.materializer.project_id()
    }

    /// Single-document operations
    pub fn documents(&self) -> &DocumentAccessor {
        &self.documents
    }

    // ========================================================================
    // Fetch-once
    // ========================================================================

    /// Executes any built descriptor
    pub async fn fetch(
        &self,
        collection: impl Into<CollectionPath>,
        query: &QueryDescriptor,
    ) -> StoreResult<ResultSet> {
        self.materializer.fetch_once(&collection.into(), query).await
    }

    pub async fn fetch_all(&self, collection: impl Into<CollectionPath>) -> StoreResult<ResultSet> {
        self.fetch(collection, &QueryDescriptor::all()).await
    }

    pub async fn fetch_all_sorted(
        &self,
        collection: impl Into<CollectionPath>,
        order: OrderSpec,
    ) -> StoreResult<ResultSet> {
        self.fetch(collection, &shape::sorted(order)?).await
    }

    pub async fn fetch_all_filtered(
        &self,
        collection: impl Into<CollectionPath>,
        predicates: &[Predicate],
    ) -> StoreResult<ResultSet> {
        self.fetch(collection, &shape::filtered(predicates)?).await
    }

    pub async fn fetch_filtered_sorted(
        &self,
        collection: impl Into<CollectionPath>,
        predicates: &[Predicate],
        order: OrderSpec,
    ) -> StoreResult<ResultSet> {
        self.fetch(collection, &shape::filtered_sorted(predicates, order)?)
            .await
    }

    pub async fn fetch_sorted_limited(
        &self,
        collection: impl Into<CollectionPath>,
        order: OrderSpec,
        limit: usize,
    ) -> StoreResult<ResultSet> {
        self.fetch(collection, &shape::sorted_limited(order, limit)?)
            .await
    }

    pub async fn fetch_filtered_sorted_limited(
        &self,
        collection: impl Into<CollectionPath>,
        predicates: &[Predicate],
        order: OrderSpec,
        limit: usize,
    ) -> StoreResult<ResultSet> {
        let query = shape::filtered_sorted_limited(predicates, order, limit)?;
        self.fetch(collection, &query).await
    }

    pub async fn fetch_filtered_sorted_range(
        &self,
        collection: impl Into<CollectionPath>,
        predicates: &[Predicate],
        range: RangeSpec,
        order: OrderSpec,
    ) -> StoreResult<ResultSet> {
        let query = shape::filtered_sorted_range(predicates, range, order, None)?;
        self.fetch(collection, &query).await
    }

    pub async fn fetch_filtered_sorted_range_limited(
        &self,
        collection: impl Into<CollectionPath>,
        predicates: &[Predicate],
        range: RangeSpec,
        order: OrderSpec,
        limit: usize,
    ) -> StoreResult<ResultSet> {
        let query = shape::filtered_sorted_range(predicates, range, order, Some(limit))?;
        self.fetch(collection, &query).await
    }

    // ========================================================================
    // Subscribe
    // ========================================================================

    /// Subscribes to any built descriptor
    pub fn subscribe(
        &self,
        collection: impl Into<CollectionPath>,
        query: &QueryDescriptor,
    ) -> Subscription<ResultSet> {
        self.materializer.subscribe(&collection.into(), query)
    }

    pub fn subscribe_all(&self, collection: impl Into<CollectionPath>) -> Subscription<ResultSet> {
        self.subscribe(collection, &QueryDescriptor::all())
    }

    pub fn subscribe_all_sorted(
        &self,
        collection: impl Into<CollectionPath>,
        order: OrderSpec,
    ) -> Subscription<ResultSet> {
        self.subscribe_shaped(collection, shape::sorted(order))
    }

    pub fn subscribe_all_filtered(
        &self,
        collection: impl Into<CollectionPath>,
        predicates: &[Predicate],
    ) -> Subscription<ResultSet> {
        self.subscribe_shaped(collection, shape::filtered(predicates))
    }

    pub fn subscribe_filtered_sorted(
        &self,
        collection: impl Into<CollectionPath>,
        predicates: &[Predicate],
        order: OrderSpec,
    ) -> Subscription<ResultSet> {
        self.subscribe_shaped(collection, shape::filtered_sorted(predicates, order))
    }

    pub fn subscribe_sorted_limited(
        &self,
        collection: impl Into<CollectionPath>,
        order: OrderSpec,
        limit: usize,
    ) -> Subscription<ResultSet> {
        self.subscribe_shaped(collection, shape::sorted_limited(order, limit))
    }

    pub fn subscribe_filtered_sorted_limited(
        &self,
        collection: impl Into<CollectionPath>,
        predicates: &[Predicate],
        order: OrderSpec,
        limit: usize,
    ) -> Subscription<ResultSet> {
        self.subscribe_shaped(
            collection,
            shape::filtered_sorted_limited(predicates, order, limit),
        )
    }

    pub fn subscribe_filtered_sorted_range(
        &self,
        collection: impl Into<CollectionPath>,
        predicates: &[Predicate],
        range: RangeSpec,
        order: OrderSpec,
    ) -> Subscription<ResultSet> {
        self.subscribe_shaped(
            collection,
            shape::filtered_sorted_range(predicates, range, order, None),
        )
    }

    pub fn subscribe_filtered_sorted_range_limited(
        &self,
        collection: impl Into<CollectionPath>,
        predicates: &[Predicate],
        range: RangeSpec,
        order: OrderSpec,
        limit: usize,
    ) -> Subscription<ResultSet> {
        self.subscribe_shaped(
            collection,
            shape::filtered_sorted_range(predicates, range, order, Some(limit)),
        )
    }

    fn subscribe_shaped(
        &self,
        collection: impl Into<CollectionPath>,
        query: StoreResult<QueryDescriptor>,
    ) -> Subscription<ResultSet> {
        let collection = collection.into();
        match query {
            Ok(query) => self.materializer.subscribe(&collection, &query),
            Err(err) => Subscription::new(self.project_id(), collection.as_str(), move || Err(err)),
        }
    }
}

/// Descriptor shapes behind the named operations
mod shape {
    use super::*;

    fn chain(predicates: &[Predicate], min: usize, max: usize) -> StoreResult<PredicateChain> {
        if predicates.len() < min || predicates.len() > max {
            return Err(StoreError::query_rejected(format!(
                "expected {} to {} predicates, got {}",
                min,
                max,
                predicates.len()
            )));
        }
        PredicateChain::from_slice(predicates)
    }

    pub(super) fn sorted(order: OrderSpec) -> StoreResult<QueryDescriptor> {
        QueryBuilder::new().with_order(order).build()
    }

    pub(super) fn filtered(predicates: &[Predicate]) -> StoreResult<QueryDescriptor> {
        QueryBuilder::from_chain(chain(predicates, 1, 3)?).build()
    }

    pub(super) fn filtered_sorted(
        predicates: &[Predicate],
        order: OrderSpec,
    ) -> StoreResult<QueryDescriptor> {
        QueryBuilder::from_chain(chain(predicates, 1, 3)?)
            .with_order(order)
            .build()
    }

    pub(super) fn sorted_limited(order: OrderSpec, limit: usize) -> StoreResult<QueryDescriptor> {
        QueryBuilder::new().with_order(order).with_limit(limit).build()
    }

    pub(super) fn filtered_sorted_limited(
        predicates: &[Predicate],
        order: OrderSpec,
        limit: usize,
    ) -> StoreResult<QueryDescriptor> {
        QueryBuilder::from_chain(chain(predicates, 0, 3)?)
            .with_order(order)
            .with_limit(limit)
            .build()
    }

    /// Range follows the caller's predicate
    pub(super) fn filtered_sorted_range(
        predicates: &[Predicate],
        range: RangeSpec,
        order: OrderSpec,
        limit: Option<usize>,
    ) -> StoreResult<QueryDescriptor> {
        let mut builder = QueryBuilder::from_chain(chain(predicates, 0, 1)?)
            .with_range(range)
            .with_order(order);
        if let Some(limit) = limit {
            builder = builder.with_limit(limit);
        }
        builder.build()
    }
}
