//! In-memory document store
//!
//! A complete [`StoreClient`] backed by per-collection ordered maps. Live
//! registrations are re-evaluated after every committed write and receive a
//! new snapshot only when their result actually changed.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::debug;
use uuid::Uuid;

use crate::client::{Listener, ListenerSender, SetOptions, StoreClient};
use crate::errors::{StoreError, StoreResult};
use crate::model::{CollectionPath, Document, DocumentId};
use crate::query::QueryDescriptor;

use super::filters::PredicateFilter;
use super::rules::QueryRules;
use super::sorter::{ResultSorter, Row};

/// Length of store-generated document ids
pub const AUTO_ID_LENGTH: usize = 20;

/// Documents per collection, keyed by collection path then document id
pub type Collections = BTreeMap<String, BTreeMap<String, Document>>;

/// Memory store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStoreConfig {
    /// Reject queries a hosted store would need a composite index for
    pub enforce_index_rules: bool,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            enforce_index_rules: true,
        }
    }
}

enum WatchKind {
    Query {
        query: QueryDescriptor,
        last: Vec<Row>,
        sender: ListenerSender<Vec<Document>>,
    },
    Document {
        id: String,
        last: Option<Document>,
        sender: ListenerSender<Option<Document>>,
    },
}

struct Watch {
    collection: String,
    kind: WatchKind,
}

impl Watch {
    /// Pushes a terminal error. The receiver sees nothing after it.
    fn fail(self, err: StoreError) {
        match self.kind {
            WatchKind::Query { sender, .. } => {
                let _ = sender.send(Err(err));
            }
            WatchKind::Document { sender, .. } => {
                let _ = sender.send(Err(err));
            }
        }
    }
}

#[derive(Default)]
struct StoreState {
    collections: HashMap<String, BTreeMap<String, Document>>,
    watches: HashMap<Uuid, Watch>,
    denied: HashSet<String>,
    unavailable: Option<String>,
}

impl StoreState {
    fn check_available(&self) -> StoreResult<()> {
        match &self.unavailable {
            Some(reason) => Err(StoreError::unavailable(reason.clone())),
            None => Ok(()),
        }
    }

    fn check_permission(&self, collection: &str) -> StoreResult<()> {
        if self.denied.contains(collection) {
            return Err(StoreError::permission_denied(format!(
                "missing or insufficient permissions for '{}'",
                collection
            )));
        }
        Ok(())
    }

    fn execute(&self, collection: &str, query: &QueryDescriptor) -> Vec<Row> {
        execute(&self.collections, collection, query)
    }

    fn lookup(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned()
    }

    /// Re-evaluates every watch on `collection` after a commit
    fn notify(&mut self, collection: &str) {
        let mut dead = Vec::new();

        for (watch_id, watch) in &mut self.watches {
            if watch.collection != collection {
                continue;
            }
            let delivered = match &mut watch.kind {
                WatchKind::Query {
                    query,
                    last,
                    sender,
                } => {
                    let current = execute(&self.collections, collection, query);
                    if same_rows(&current, last) {
                        true
                    } else {
                        let snapshot = payloads(&current);
                        *last = current;
                        sender.send(Ok(snapshot)).is_ok()
                    }
                }
                WatchKind::Document { id, last, sender } => {
                    let current = self
                        .collections
                        .get(collection)
                        .and_then(|documents| documents.get(id.as_str()))
                        .cloned();
                    if same_document(current.as_ref(), last.as_ref()) {
                        true
                    } else {
                        *last = current.clone();
                        sender.send(Ok(current)).is_ok()
                    }
                }
            };
            if !delivered {
                dead.push(*watch_id);
            }
        }

        for watch_id in dead {
            debug!(watch_id = %watch_id, "dropping disconnected watch");
            self.watches.remove(&watch_id);
        }
    }
}

/// Ids and payloads must both match; numbers compare by representation.
fn same_rows(current: &[Row], last: &[Row]) -> bool {
    current.len() == last.len()
        && current
            .iter()
            .zip(last)
            .all(|(a, b)| a.id == b.id && a.data.is_identical(&b.data))
}

fn same_document(current: Option<&Document>, last: Option<&Document>) -> bool {
    match (current, last) {
        (Some(a), Some(b)) => a.is_identical(b),
        (None, None) => true,
        _ => false,
    }
}

fn payloads(rows: &[Row]) -> Vec<Document> {
    rows.iter().map(|row| row.data.clone()).collect()
}

fn execute(
    collections: &HashMap<String, BTreeMap<String, Document>>,
    collection: &str,
    query: &QueryDescriptor,
) -> Vec<Row> {
    let Some(documents) = collections.get(collection) else {
        return Vec::new();
    };

    let clauses = query.where_clauses();
    let rows: Vec<Row> = documents
        .iter()
        .filter(|(id, doc)| PredicateFilter::matches(id, doc, &clauses))
        .map(|(id, doc)| Row {
            id: id.clone(),
            data: doc.clone(),
        })
        .collect();

    let mut rows = ResultSorter::sort(rows, query.order());
    if let Some(limit) = query.limit() {
        rows.truncate(limit);
    }
    rows
}

/// In-memory [`StoreClient`]
pub struct MemoryStore {
    project_id: String,
    rules: QueryRules,
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self::with_config(project_id, MemoryStoreConfig::default())
    }

    pub fn with_config(project_id: impl Into<String>, config: MemoryStoreConfig) -> Self {
        Self {
            project_id: project_id.into(),
            rules: QueryRules::new(config.enforce_index_rules),
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, StoreState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::unavailable("store state poisoned"))
    }

    fn lock_admin(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bulk-loads documents, replacing any with the same id
    pub fn load(&self, data: Collections) {
        let mut state = self.lock_admin();
        for (collection, documents) in data {
            state
                .collections
                .entry(collection.clone())
                .or_default()
                .extend(documents);
            state.notify(&collection);
        }
    }

    /// Takes the store offline or back online.
    ///
    /// Going offline fails every open registration with a terminal
    /// `Unavailable` and rejects all further operations until restored.
    pub fn set_available(&self, available: bool) {
        let mut state = self.lock_admin();
        if available {
            state.unavailable = None;
            return;
        }

        let reason = format!("project '{}' is offline", self.project_id);
        state.unavailable = Some(reason.clone());
        for (_, watch) in state.watches.drain() {
            watch.fail(StoreError::unavailable(reason.clone()));
        }
    }

    /// Revokes access to a collection. Open registrations on it fail with
    /// a terminal `PermissionDenied`.
    pub fn deny(&self, collection: impl Into<String>) {
        let collection = collection.into();
        let mut state = self.lock_admin();

        let revoked: Vec<Uuid> = state
            .watches
            .iter()
            .filter(|(_, watch)| watch.collection == collection)
            .map(|(id, _)| *id)
            .collect();
        state.denied.insert(collection.clone());

        for watch_id in revoked {
            if let Some(watch) = state.watches.remove(&watch_id) {
                watch.fail(StoreError::permission_denied(format!(
                    "access to '{}' revoked",
                    collection
                )));
            }
        }
    }

    /// Restores access to a collection
    pub fn allow(&self, collection: &str) {
        self.lock_admin().denied.remove(collection);
    }

    /// Number of live registrations
    pub fn listener_count(&self) -> usize {
        self.lock_admin().watches.len()
    }

    fn release_hook(&self, watch_id: Uuid) -> impl FnOnce() + Send + 'static {
        let state: Weak<Mutex<StoreState>> = Arc::downgrade(&self.state);
        move || {
            if let Some(state) = state.upgrade() {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                state.watches.remove(&watch_id);
            }
        }
    }

    fn generate_id(state: &StoreState, collection: &str) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(AUTO_ID_LENGTH)
                .map(char::from)
                .collect();
            let taken = state
                .collections
                .get(collection)
                .map_or(false, |documents| documents.contains_key(&id));
            if !taken {
                return id;
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    fn project_id(&self) -> &str {
        &self.project_id
    }

    async fn run_query(
        &self,
        collection: &CollectionPath,
        query: &QueryDescriptor,
    ) -> StoreResult<Vec<Document>> {
        let state = self.lock()?;
        state.check_available()?;
        self.rules.validate(query)?;
        state.check_permission(collection.as_str())?;
        Ok(payloads(&state.execute(collection.as_str(), query)))
    }

    async fn get_document(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
    ) -> StoreResult<Option<Document>> {
        let state = self.lock()?;
        state.check_available()?;
        state.check_permission(collection.as_str())?;
        Ok(state.lookup(collection.as_str(), id.as_str()))
    }

    async fn set_document(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
        data: Document,
        options: SetOptions,
    ) -> StoreResult<()> {
        let mut state = self.lock()?;
        state.check_available()?;
        state.check_permission(collection.as_str())?;

        let documents = state
            .collections
            .entry(collection.as_str().to_string())
            .or_default();
        match documents.get_mut(id.as_str()) {
            Some(existing) if options.merge => existing.merge(data),
            _ => {
                documents.insert(id.as_str().to_string(), data);
            }
        }

        state.notify(collection.as_str());
        Ok(())
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        data: Document,
    ) -> StoreResult<DocumentId> {
        let mut state = self.lock()?;
        state.check_available()?;
        state.check_permission(collection.as_str())?;

        let id = Self::generate_id(&state, collection.as_str());
        state
            .collections
            .entry(collection.as_str().to_string())
            .or_default()
            .insert(id.clone(), data);

        state.notify(collection.as_str());
        Ok(DocumentId::new(id))
    }

    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
    ) -> StoreResult<()> {
        let mut state = self.lock()?;
        state.check_available()?;
        state.check_permission(collection.as_str())?;

        let removed = state
            .collections
            .get_mut(collection.as_str())
            .and_then(|documents| documents.remove(id.as_str()));
        if removed.is_some() {
            state.notify(collection.as_str());
        }
        Ok(())
    }

    fn listen_query(
        &self,
        collection: &CollectionPath,
        query: &QueryDescriptor,
    ) -> StoreResult<Listener<Vec<Document>>> {
        let mut state = self.lock()?;
        state.check_available()?;
        self.rules.validate(query)?;
        state.check_permission(collection.as_str())?;

        let watch_id = Uuid::new_v4();
        let initial = state.execute(collection.as_str(), query);
        let (sender, listener) = Listener::channel(self.release_hook(watch_id));
        let _ = sender.send(Ok(payloads(&initial)));

        state.watches.insert(
            watch_id,
            Watch {
                collection: collection.as_str().to_string(),
                kind: WatchKind::Query {
                    query: query.clone(),
                    last: initial,
                    sender,
                },
            },
        );
        Ok(listener)
    }

    fn listen_document(
        &self,
        collection: &CollectionPath,
        id: &DocumentId,
    ) -> StoreResult<Listener<Option<Document>>> {
        let mut state = self.lock()?;
        state.check_available()?;
        state.check_permission(collection.as_str())?;

        let watch_id = Uuid::new_v4();
        let initial = state.lookup(collection.as_str(), id.as_str());
        let (sender, listener) = Listener::channel(self.release_hook(watch_id));
        let _ = sender.send(Ok(initial.clone()));

        state.watches.insert(
            watch_id,
            Watch {
                collection: collection.as_str().to_string(),
                kind: WatchKind::Document {
                    id: id.as_str().to_string(),
                    last: initial,
                    sender,
                },
            },
        );
        Ok(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;

    use crate::model::Value;
    use crate::query::{OrderSpec, Predicate, QueryBuilder};

    fn col(name: &str) -> CollectionPath {
        CollectionPath::new(name)
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new("test");
        for (id, value) in [("a", 10), ("b", 5), ("c", 7)] {
            store
                .set_document(
                    &col("waiting-time"),
                    &DocumentId::new(id),
                    Document::new().with("value", value),
                    SetOptions::overwrite(),
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_query_sort_and_limit() {
        let store = seeded().await;
        let query = QueryBuilder::new()
            .with_order(OrderSpec::asc("value"))
            .with_limit(1)
            .build()
            .unwrap();

        let results = store.run_query(&col("waiting-time"), &query).await.unwrap();
        assert_eq!(results, vec![Document::new().with("value", 5)]);
    }

    #[tokio::test]
    async fn test_unordered_results_in_id_order() {
        let store = seeded().await;
        let results = store
            .run_query(&col("waiting-time"), &QueryDescriptor::all())
            .await
            .unwrap();
        let values: Vec<_> = results.iter().map(|d| d.get("value").cloned()).collect();
        assert_eq!(
            values,
            vec![Some(Value::from(10)), Some(Value::from(5)), Some(Value::from(7))]
        );
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let store = MemoryStore::new("test");
        let results = store
            .run_query(&col("productivity"), &QueryDescriptor::all())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_merge_versus_overwrite() {
        let store = MemoryStore::new("test");
        let id = DocumentId::new("x");
        store
            .set_document(
                &col("c"),
                &id,
                Document::new().with("a", 1).with("b", 2),
                SetOptions::overwrite(),
            )
            .await
            .unwrap();
        store
            .set_document(&col("c"), &id, Document::new().with("b", 3), SetOptions::merge())
            .await
            .unwrap();
        let merged = store.get_document(&col("c"), &id).await.unwrap().unwrap();
        assert_eq!(merged, Document::new().with("a", 1).with("b", 3));

        store
            .set_document(&col("c"), &id, Document::new().with("z", 0), SetOptions::overwrite())
            .await
            .unwrap();
        let replaced = store.get_document(&col("c"), &id).await.unwrap().unwrap();
        assert_eq!(replaced, Document::new().with("z", 0));
    }

    #[tokio::test]
    async fn test_add_generates_id() {
        let store = MemoryStore::new("test");
        let id = store
            .add_document(&col("c"), Document::new().with("a", 1))
            .await
            .unwrap();
        assert_eq!(id.as_str().len(), AUTO_ID_LENGTH);
        assert!(id.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(store.get_document(&col("c"), &id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rules_reject_before_permission() {
        let store = seeded().await;
        store.deny("waiting-time");
        let query = QueryBuilder::new()
            .with_predicate(Predicate::gt("a", 1))
            .with_predicate(Predicate::gt("b", 1))
            .build()
            .unwrap();
        let err = store.run_query(&col("waiting-time"), &query).await.unwrap_err();
        assert!(matches!(err, StoreError::QueryRejected(_)));

        let err = store
            .run_query(&col("waiting-time"), &QueryDescriptor::all())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));

        store.allow("waiting-time");
        assert!(store
            .run_query(&col("waiting-time"), &QueryDescriptor::all())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_rejects_everything() {
        let store = seeded().await;
        store.set_available(false);
        let err = store
            .get_document(&col("waiting-time"), &DocumentId::new("a"))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());

        store.set_available(true);
        assert!(store
            .get_document(&col("waiting-time"), &DocumentId::new("a"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_listen_emits_initial_and_changes_only() {
        let store = seeded().await;
        let query = QueryBuilder::new()
            .with_predicate(Predicate::gte("value", 7))
            .build()
            .unwrap();
        let mut listener = store.listen_query(&col("waiting-time"), &query).unwrap();

        let initial = listener.recv().await.unwrap().unwrap();
        assert_eq!(initial.len(), 2);

        // Not in the result set: no emission.
        store
            .set_document(
                &col("waiting-time"),
                &DocumentId::new("d"),
                Document::new().with("value", 1),
                SetOptions::overwrite(),
            )
            .await
            .unwrap();
        store
            .set_document(
                &col("waiting-time"),
                &DocumentId::new("e"),
                Document::new().with("value", 9),
                SetOptions::overwrite(),
            )
            .await
            .unwrap();

        let next = listener.recv().await.unwrap().unwrap();
        assert_eq!(next.len(), 3);
    }

    #[tokio::test]
    async fn test_rewriting_nan_is_not_a_change() {
        async fn write(store: &MemoryStore, value: f64) {
            store
                .set_document(
                    &col("metrics"),
                    &DocumentId::new("m"),
                    Document::new().with("value", value),
                    SetOptions::overwrite(),
                )
                .await
                .unwrap();
        }

        let store = MemoryStore::new("test");
        write(&store, f64::NAN).await;

        let mut listener = store
            .listen_query(&col("metrics"), &QueryDescriptor::all())
            .unwrap();
        assert_eq!(listener.recv().await.unwrap().unwrap().len(), 1);

        write(&store, f64::NAN).await;
        assert!(listener.recv().now_or_never().is_none());

        write(&store, 1.5).await;
        let next = listener.recv().now_or_never().unwrap().unwrap().unwrap();
        assert_eq!(next, vec![Document::new().with("value", 1.5)]);
    }

    #[tokio::test]
    async fn test_release_deregisters() {
        let store = seeded().await;
        let listener = store
            .listen_document(&col("waiting-time"), &DocumentId::new("a"))
            .unwrap();
        assert_eq!(store.listener_count(), 1);
        drop(listener);
        assert_eq!(store.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_offline_fails_watches() {
        let store = seeded().await;
        let mut listener = store
            .listen_document(&col("waiting-time"), &DocumentId::new("a"))
            .unwrap();
        assert!(listener.recv().await.unwrap().unwrap().is_some());

        store.set_available(false);
        let err = listener.recv().await.unwrap().unwrap_err();
        assert!(err.is_unavailable());
        assert!(listener.recv().await.is_none());
        assert_eq!(store.listener_count(), 0);
    }
}
