//! Predicate evaluation for the in-memory store
//!
//! All predicates must match (AND semantics). Missing fields never match,
//! not even for `!=` and `not-in`. Ordering comparisons only match values
//! of the same type class.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::model::{Document, FieldRef, Value};
use crate::query::{ComparisonOperator, Predicate};

/// Evaluates predicates against stored documents
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a document matches all predicates
    pub fn matches(id: &str, document: &Document, predicates: &[Predicate]) -> bool {
        predicates
            .iter()
            .all(|pred| Self::matches_predicate(id, document, pred))
    }

    /// Checks if a document matches a single predicate
    fn matches_predicate(id: &str, document: &Document, predicate: &Predicate) -> bool {
        let Some(actual) = field_value(id, document, &predicate.field) else {
            return false;
        };
        let actual = actual.as_ref();
        let operand = &predicate.value;

        match predicate.op {
            ComparisonOperator::Equal => actual == operand,
            ComparisonOperator::NotEqual => !actual.is_null() && actual != operand,
            ComparisonOperator::LessThan => actual.compare(operand) == Some(Ordering::Less),
            ComparisonOperator::LessThanOrEqual => matches!(
                actual.compare(operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            ComparisonOperator::GreaterThan => {
                actual.compare(operand) == Some(Ordering::Greater)
            }
            ComparisonOperator::GreaterThanOrEqual => matches!(
                actual.compare(operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            ComparisonOperator::ArrayContains => actual
                .as_array()
                .map_or(false, |items| items.contains(operand)),
            ComparisonOperator::In => candidates(operand).contains(actual),
            ComparisonOperator::NotIn => {
                !actual.is_null() && !candidates(operand).contains(actual)
            }
            ComparisonOperator::ArrayContainsAny => {
                let wanted = candidates(operand);
                actual
                    .as_array()
                    .map_or(false, |items| items.iter().any(|item| wanted.contains(item)))
            }
        }
    }
}

/// Resolves a field, synthesizing the document id for `__name__`
pub(crate) fn field_value<'a>(
    id: &str,
    document: &'a Document,
    field: &FieldRef,
) -> Option<Cow<'a, Value>> {
    if field.is_document_id() {
        return Some(Cow::Owned(Value::String(id.to_string())));
    }
    document.resolve(field).map(Cow::Borrowed)
}

fn candidates(operand: &Value) -> &[Value] {
    operand.as_array().unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        Document::from_json(value).unwrap()
    }

    #[test]
    fn test_equality_match() {
        let d = doc(json!({"name": "Alice", "age": 30}));
        assert!(PredicateFilter::matches("a", &d, &[Predicate::eq("name", "Alice")]));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::eq("name", "Bob")]));
    }

    #[test]
    fn test_no_type_coercion() {
        let d = doc(json!({"value": 123}));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::eq("value", "123")]));
        assert!(PredicateFilter::matches("a", &d, &[Predicate::eq("value", 123)]));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::gt("value", "1")]));
    }

    #[test]
    fn test_range_predicates() {
        let d = doc(json!({"age": 25}));
        assert!(PredicateFilter::matches("a", &d, &[Predicate::gte("age", 25)]));
        assert!(PredicateFilter::matches("a", &d, &[Predicate::lte("age", 30.5)]));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::gt("age", 25)]));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::lt("age", 25)]));
    }

    #[test]
    fn test_timestamp_window() {
        let d = doc(json!({"at": {"$timestamp": "2024-05-01T12:00:00Z"}}));
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        let window = [Predicate::gte("at", start), Predicate::lt("at", end)];
        assert!(PredicateFilter::matches("a", &d, &window));

        let at_end = doc(json!({"at": {"$timestamp": "2024-05-02T00:00:00Z"}}));
        assert!(!PredicateFilter::matches("a", &at_end, &window));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let d = doc(json!({"name": "Alice"}));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::eq("age", 30)]));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::ne("age", 30)]));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::not_in("age", vec![1])]));
    }

    #[test]
    fn test_not_equal_excludes_null() {
        let d = doc(json!({"name": null}));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::ne("name", "Alice")]));
        assert!(PredicateFilter::matches("a", &d, &[Predicate::eq("name", Value::Null)]));
    }

    #[test]
    fn test_array_operators() {
        let d = doc(json!({"tags": ["red", "blue"], "kind": "b"}));
        assert!(PredicateFilter::matches("a", &d, &[Predicate::array_contains("tags", "red")]));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::array_contains("tags", "green")]));
        assert!(PredicateFilter::matches(
            "a",
            &d,
            &[Predicate::array_contains_any("tags", vec!["green", "blue"])]
        ));
        assert!(PredicateFilter::matches("a", &d, &[Predicate::is_in("kind", vec!["a", "b"])]));
        assert!(!PredicateFilter::matches("a", &d, &[Predicate::not_in("kind", vec!["b"])]));
    }

    #[test]
    fn test_document_id_field() {
        let d = doc(json!({}));
        assert!(PredicateFilter::matches(
            "abc",
            &d,
            &[Predicate::eq(FieldRef::document_id(), "abc")]
        ));
    }

    #[test]
    fn test_nested_field() {
        let d = doc(json!({"meta": {"owner": "x"}}));
        assert!(PredicateFilter::matches("a", &d, &[Predicate::eq("meta.owner", "x")]));
    }
}
