//! # In-memory Store
//!
//! Reference [`StoreClient`](crate::client::StoreClient) used by the CLI,
//! seeded tenants, and tests.
//!
//! Query execution follows hosted document store semantics:
//! 1. Apply every where clause (AND), range expanded in place
//! 2. Drop documents missing the order field, then sort with id tie-break
//! 3. Truncate to the limit
//!
//! Live registrations are recomputed on each commit and only receive a
//! snapshot when their result changed.

mod filters;
mod rules;
mod sorter;
mod store;

pub use filters::PredicateFilter;
pub use rules::{QueryRules, MAX_LIST_OPERAND};
pub use store::{Collections, MemoryStore, MemoryStoreConfig, AUTO_ID_LENGTH};
