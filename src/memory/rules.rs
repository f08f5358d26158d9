//! Query acceptance rules for the in-memory store
//!
//! Mirrors what a hosted document store rejects before executing:
//!
//! - list operators (`in`, `not-in`, `array-contains-any`) need a
//!   non-empty list of at most ten values
//! - at most one `array-contains` and at most one list operator
//! - `not-in` cannot be combined with `!=`
//!
//! With index rules enforced, additionally:
//!
//! - inequality filters may target a single field only
//! - an ordering combined with an inequality must be on that field

use crate::errors::{StoreError, StoreResult};
use crate::model::FieldRef;
use crate::query::{ComparisonOperator, QueryDescriptor};

/// Largest list accepted by list operators
pub const MAX_LIST_OPERAND: usize = 10;

/// Validates a descriptor against store rules
pub struct QueryRules {
    enforce_index_rules: bool,
}

impl QueryRules {
    pub fn new(enforce_index_rules: bool) -> Self {
        Self {
            enforce_index_rules,
        }
    }

    /// Returns `QueryRejected` describing the first violated rule
    pub fn validate(&self, query: &QueryDescriptor) -> StoreResult<()> {
        let clauses = query.where_clauses();

        let mut array_contains = 0;
        let mut list_ops = 0;
        let mut has_not_equal = false;
        let mut has_not_in = false;
        let mut inequality_field: Option<&FieldRef> = None;

        for clause in &clauses {
            if clause.op.takes_list() {
                let len = clause.value.as_array().map(<[_]>::len).unwrap_or(0);
                if len == 0 || len > MAX_LIST_OPERAND {
                    return Err(StoreError::query_rejected(format!(
                        "'{}' on '{}' requires a list of 1 to {} values",
                        clause.op, clause.field, MAX_LIST_OPERAND
                    )));
                }
                list_ops += 1;
            }

            match clause.op {
                ComparisonOperator::ArrayContains => array_contains += 1,
                ComparisonOperator::NotEqual => has_not_equal = true,
                ComparisonOperator::NotIn => has_not_in = true,
                _ => {}
            }

            if self.enforce_index_rules && clause.is_inequality() {
                match inequality_field {
                    Some(field) if !field.same_field(&clause.field) => {
                        return Err(StoreError::query_rejected(format!(
                            "inequality filters on '{}' and '{}' require a composite index",
                            field, clause.field
                        )));
                    }
                    _ => inequality_field = Some(&clause.field),
                }
            }
        }

        if array_contains > 1 {
            return Err(StoreError::query_rejected(
                "at most one 'array-contains' filter per query",
            ));
        }
        if list_ops > 1 {
            return Err(StoreError::query_rejected(
                "at most one 'in', 'not-in' or 'array-contains-any' filter per query",
            ));
        }
        if has_not_equal && has_not_in {
            return Err(StoreError::query_rejected(
                "'not-in' cannot be combined with '!='",
            ));
        }

        if let (Some(field), Some(order)) = (inequality_field, query.order()) {
            if !field.same_field(&order.field) {
                return Err(StoreError::query_rejected(format!(
                    "ordering on '{}' with an inequality on '{}' requires a composite index",
                    order.field, field
                )));
            }
        }

        Ok(())
    }
}
