//! Filter predicates
//!
//! A predicate is a `(field, operator, value)` triple. Nothing here checks
//! that the operator suits the value; the store decides.

use std::fmt;
use std::str::FromStr;

use crate::errors::StoreError;
use crate::model::{FieldRef, Value};

/// Comparison operators understood by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    ArrayContains,
    In,
    NotIn,
    ArrayContainsAny,
}

impl ComparisonOperator {
    /// Returns the operator symbol used in explain output
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::ArrayContains => "array-contains",
            ComparisonOperator::In => "in",
            ComparisonOperator::NotIn => "not-in",
            ComparisonOperator::ArrayContainsAny => "array-contains-any",
        }
    }

    /// Operators the store treats as inequalities for index matching
    pub fn is_inequality(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::NotEqual
                | ComparisonOperator::LessThan
                | ComparisonOperator::LessThanOrEqual
                | ComparisonOperator::GreaterThan
                | ComparisonOperator::GreaterThanOrEqual
                | ComparisonOperator::NotIn
        )
    }

    /// Operators whose operand is a list of candidates
    pub fn takes_list(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::In | ComparisonOperator::NotIn | ComparisonOperator::ArrayContainsAny
        )
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOperator {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(ComparisonOperator::Equal),
            "!=" => Ok(ComparisonOperator::NotEqual),
            "<" => Ok(ComparisonOperator::LessThan),
            "<=" => Ok(ComparisonOperator::LessThanOrEqual),
            ">" => Ok(ComparisonOperator::GreaterThan),
            ">=" => Ok(ComparisonOperator::GreaterThanOrEqual),
            "array-contains" => Ok(ComparisonOperator::ArrayContains),
            "in" => Ok(ComparisonOperator::In),
            "not-in" => Ok(ComparisonOperator::NotIn),
            "array-contains-any" => Ok(ComparisonOperator::ArrayContainsAny),
            other => Err(StoreError::query_rejected(format!(
                "unknown comparison operator '{}'",
                other
            ))),
        }
    }
}

/// A single filter condition
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: FieldRef,
    pub op: ComparisonOperator,
    pub value: Value,
}

impl Predicate {
    pub fn new(field: impl Into<FieldRef>, op: ComparisonOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new(field, ComparisonOperator::Equal, value)
    }

    pub fn ne(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new(field, ComparisonOperator::NotEqual, value)
    }

    pub fn lt(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new(field, ComparisonOperator::LessThan, value)
    }

    pub fn lte(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new(field, ComparisonOperator::LessThanOrEqual, value)
    }

    pub fn gt(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new(field, ComparisonOperator::GreaterThan, value)
    }

    pub fn gte(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new(field, ComparisonOperator::GreaterThanOrEqual, value)
    }

    pub fn array_contains(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new(field, ComparisonOperator::ArrayContains, value)
    }

    pub fn is_in(field: impl Into<FieldRef>, values: impl Into<Value>) -> Self {
        Self::new(field, ComparisonOperator::In, values)
    }

    pub fn not_in(field: impl Into<FieldRef>, values: impl Into<Value>) -> Self {
        Self::new(field, ComparisonOperator::NotIn, values)
    }

    pub fn array_contains_any(field: impl Into<FieldRef>, values: impl Into<Value>) -> Self {
        Self::new(field, ComparisonOperator::ArrayContainsAny, values)
    }

    pub fn is_inequality(&self) -> bool {
        self.op.is_inequality()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}
