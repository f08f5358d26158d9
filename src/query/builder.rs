//! Predicate chaining and query shaping
//!
//! [`PredicateChain`] holds zero to three predicates in caller order.
//! [`QueryBuilder`] shapes a chain with a range, an ordering and a limit,
//! and checks the descriptor invariants once, in [`QueryBuilder::build`]:
//!
//! - at most three explicit predicates
//! - at most one range
//! - limit, if present, is positive
//!
//! Everything else (operator/value compatibility, index requirements) is
//! left to the store.

use std::num::NonZeroUsize;

use crate::errors::{StoreError, StoreResult};

use super::descriptor::{Filter, OrderSpec, QueryDescriptor, RangeSpec, MAX_PREDICATES};
use super::predicate::Predicate;

/// Zero to three predicates, order preserved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateChain {
    predicates: Vec<Predicate>,
}

impl PredicateChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a chain from a slice, rejecting more than three predicates.
    pub fn from_slice(predicates: &[Predicate]) -> StoreResult<Self> {
        let mut chain = Self::new();
        for predicate in predicates {
            chain.push(predicate.clone())?;
        }
        Ok(chain)
    }

    /// Appends a predicate.
    pub fn push(&mut self, predicate: Predicate) -> StoreResult<()> {
        if self.predicates.len() >= MAX_PREDICATES {
            return Err(too_many_predicates(self.predicates.len() + 1));
        }
        self.predicates.push(predicate);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.predicates.iter()
    }
}

impl IntoIterator for PredicateChain {
    type Item = Predicate;
    type IntoIter = std::vec::IntoIter<Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates.into_iter()
    }
}

/// Accumulates a [`QueryDescriptor`]
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    filters: Vec<Filter>,
    order: Option<OrderSpec>,
    limit: Option<usize>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing predicate chain
    pub fn from_chain(chain: PredicateChain) -> Self {
        Self {
            filters: chain.into_iter().map(Filter::Predicate).collect(),
            ..Self::default()
        }
    }

    /// Appends a predicate after everything added so far
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.filters.push(Filter::Predicate(predicate));
        self
    }

    /// Appends several predicates in order
    pub fn with_predicates<I>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        self.filters
            .extend(predicates.into_iter().map(Filter::Predicate));
        self
    }

    /// Appends the range as one unit at the current position
    pub fn with_range(mut self, range: RangeSpec) -> Self {
        self.filters.push(Filter::Range(range));
        self
    }

    /// Sets the ordering, replacing any previous one
    pub fn with_order(mut self, order: OrderSpec) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validates and freezes the descriptor.
    pub fn build(self) -> StoreResult<QueryDescriptor> {
        let predicate_count = self
            .filters
            .iter()
            .filter(|f| matches!(f, Filter::Predicate(_)))
            .count();
        if predicate_count > MAX_PREDICATES {
            return Err(too_many_predicates(predicate_count));
        }

        let range_count = self
            .filters
            .iter()
            .filter(|f| matches!(f, Filter::Range(_)))
            .count();
        if range_count > 1 {
            return Err(StoreError::query_rejected(format!(
                "at most one range per query, got {}",
                range_count
            )));
        }

        let limit = match self.limit {
            Some(limit) => Some(NonZeroUsize::new(limit).ok_or_else(|| {
                StoreError::query_rejected("limit must be a positive integer")
            })?),
            None => None,
        };

        Ok(QueryDescriptor {
            filters: self.filters,
            order: self.order,
            limit,
        })
    }
}

fn too_many_predicates(count: usize) -> StoreError {
    StoreError::query_rejected(format!(
        "at most {} predicates per query, got {}",
        MAX_PREDICATES, count
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Direction;

    #[test]
    fn test_chain_preserves_order() {
        let chain = PredicateChain::from_slice(&[
            Predicate::eq("b", 1),
            Predicate::eq("a", 2),
        ])
        .unwrap();
        let fields: Vec<String> = chain.iter().map(|p| p.field.to_string()).collect();
        assert_eq!(fields, ["b", "a"]);
    }

    #[test]
    fn test_chain_rejects_fourth_predicate() {
        let mut chain = PredicateChain::new();
        for i in 0..3 {
            chain.push(Predicate::eq("f", i)).unwrap();
        }
        let err = chain.push(Predicate::eq("f", 3)).unwrap_err();
        assert_eq!(err.code(), "DUO_QUERY_REJECTED");
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_builder_rejects_too_many_predicates() {
        let result = QueryBuilder::new()
            .with_predicates((0..4).map(|i| Predicate::eq("f", i)))
            .build();
        assert!(matches!(result, Err(StoreError::QueryRejected(_))));
    }

    #[test]
    fn test_range_does_not_count_as_predicate() {
        let query = QueryBuilder::new()
            .with_predicates((0..3).map(|i| Predicate::eq("f", i)))
            .with_range(RangeSpec::new("day", 1, 2))
            .build()
            .unwrap();
        assert_eq!(query.predicates().count(), 3);
        assert!(query.range().is_some());
    }

    #[test]
    fn test_second_range_rejected() {
        let result = QueryBuilder::new()
            .with_range(RangeSpec::new("day", 1, 2))
            .with_range(RangeSpec::new("day", 3, 4))
            .build();
        assert!(matches!(result, Err(StoreError::QueryRejected(_))));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let result = QueryBuilder::new().with_limit(0).build();
        assert!(matches!(result, Err(StoreError::QueryRejected(_))));
    }

    #[test]
    fn test_shaping() {
        let query = QueryBuilder::from_chain(
            PredicateChain::from_slice(&[Predicate::eq("status", "open")]).unwrap(),
        )
        .with_order(OrderSpec::desc("value"))
        .with_limit(5)
        .build()
        .unwrap();

        assert_eq!(query.limit(), Some(5));
        assert_eq!(query.order().map(|o| o.direction), Some(Direction::Descending));
        assert_eq!(query.predicates().count(), 1);
    }
}
