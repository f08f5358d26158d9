//! Query construction
//!
//! Turns caller parameters into an immutable [`QueryDescriptor`]:
//!
//! 1. Predicates are chained in caller order (at most three)
//! 2. A half-open range is inserted as one unit next to them
//! 3. Ordering and a positive limit are applied on top
//!
//! No schema or index checks happen here. Whatever the store rejects is
//! surfaced to the caller as `QueryRejected`.

mod builder;
mod descriptor;
mod explain;
mod predicate;

pub use builder::{PredicateChain, QueryBuilder};
pub use descriptor::{Direction, Filter, OrderSpec, QueryDescriptor, RangeSpec, MAX_PREDICATES};
pub use explain::ExplainQuery;
pub use predicate::{ComparisonOperator, Predicate};
