//! Query descriptors
//!
//! A descriptor is the immutable, fully shaped form of a query: up to
//! three predicates, at most one half-open range, an optional ordering
//! and an optional positive limit. Build one with
//! [`QueryBuilder`](super::QueryBuilder).

use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::errors::StoreError;
use crate::model::{FieldRef, Value};

use super::predicate::{ComparisonOperator, Predicate};

/// Maximum number of explicit predicates in one descriptor
pub const MAX_PREDICATES: usize = 3;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

impl FromStr for Direction {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ascending" => Ok(Direction::Ascending),
            "desc" | "descending" => Ok(Direction::Descending),
            other => Err(StoreError::query_rejected(format!(
                "unknown order direction '{}'",
                other
            ))),
        }
    }
}

/// Ordering specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: FieldRef,
    pub direction: Direction,
}

impl OrderSpec {
    pub fn new(field: impl Into<FieldRef>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<FieldRef>) -> Self {
        Self::new(field, Direction::Ascending)
    }

    pub fn desc(field: impl Into<FieldRef>) -> Self {
        Self::new(field, Direction::Descending)
    }
}

/// Half-open window `lower <= field < upper`, usually over timestamps
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
    pub field: FieldRef,
    pub lower: Value,
    pub upper: Value,
}

impl RangeSpec {
    pub fn new(field: impl Into<FieldRef>, lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    /// The two inequality predicates the range stands for
    pub fn to_predicates(&self) -> [Predicate; 2] {
        [
            Predicate::new(
                self.field.clone(),
                ComparisonOperator::GreaterThanOrEqual,
                self.lower.clone(),
            ),
            Predicate::new(
                self.field.clone(),
                ComparisonOperator::LessThan,
                self.upper.clone(),
            ),
        ]
    }
}

/// One logical filter unit. A range counts as a single unit and is never
/// split by other predicates.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Predicate(Predicate),
    Range(RangeSpec),
}

/// Immutable query shape
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryDescriptor {
    pub(crate) filters: Vec<Filter>,
    pub(crate) order: Option<OrderSpec>,
    pub(crate) limit: Option<NonZeroUsize>,
}

impl QueryDescriptor {
    /// Descriptor matching every document in store order
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter units in caller order
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Explicit predicates, excluding the range
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.filters.iter().filter_map(|f| match f {
            Filter::Predicate(p) => Some(p),
            Filter::Range(_) => None,
        })
    }

    pub fn range(&self) -> Option<&RangeSpec> {
        self.filters.iter().find_map(|f| match f {
            Filter::Range(r) => Some(r),
            Filter::Predicate(_) => None,
        })
    }

    pub fn order(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit.map(NonZeroUsize::get)
    }

    /// Every clause the store must apply, with the range expanded in place
    /// into its `>=` / `<` pair.
    pub fn where_clauses(&self) -> Vec<Predicate> {
        let mut clauses = Vec::with_capacity(self.filters.len() + 1);
        for filter in &self.filters {
            match filter {
                Filter::Predicate(p) => clauses.push(p.clone()),
                Filter::Range(r) => clauses.extend(r.to_predicates()),
            }
        }
        clauses
    }

    /// True when no filter, order or limit is applied
    pub fn is_unconstrained(&self) -> bool {
        self.filters.is_empty() && self.order.is_none() && self.limit.is_none()
    }
}
