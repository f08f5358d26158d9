//! duostore - query and document access over tenant document stores
//!
//! A [`DocumentFacade`] per tenant exposes named fetch-once and subscribe
//! operations built from at most three predicates, an optional half-open
//! range, an ordering and a limit, plus single-document access. Stores sit
//! behind the [`StoreClient`] trait; [`MemoryStore`] is the in-process
//! implementation.

pub mod cli;
pub mod client;
pub mod config;
pub mod documents;
pub mod errors;
pub mod facade;
pub mod materializer;
pub mod memory;
pub mod model;
pub mod observability;
pub mod query;
pub mod realtime;
pub mod tenant;

pub use client::{Listener, SetOptions, StoreClient};
pub use config::{ConfigError, FacadeConfig, TenantConfig};
pub use documents::DocumentAccessor;
pub use errors::{StoreError, StoreResult};
pub use facade::DocumentFacade;
pub use materializer::{ResultMaterializer, ResultSet};
pub use memory::{MemoryStore, MemoryStoreConfig};
pub use model::{CollectionPath, Document, DocumentId, FieldRef, Timestamp, Value};
pub use query::{
    ComparisonOperator, Direction, OrderSpec, Predicate, PredicateChain, QueryBuilder,
    QueryDescriptor, RangeSpec,
};
pub use realtime::Subscription;
pub use tenant::{Tenants, PROJECT_ONE, PROJECT_TWO};
