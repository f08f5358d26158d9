//! Result ordering for the in-memory store
//!
//! Without an order, rows come back in document id order. With one, rows
//! missing the order field are dropped and ties fall back to document id
//! in the same direction.

use crate::model::Document;
use crate::query::{Direction, OrderSpec};

use super::filters::field_value;

/// A stored document together with its id
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub id: String,
    pub data: Document,
}

/// Sorts result rows
pub struct ResultSorter;

impl ResultSorter {
    /// Applies the ordering, if any. Input must already be in id order.
    pub(crate) fn sort(rows: Vec<Row>, order: Option<&OrderSpec>) -> Vec<Row> {
        let Some(order) = order else {
            return rows;
        };

        let mut keyed: Vec<_> = rows
            .into_iter()
            .filter_map(|row| {
                let key = field_value(&row.id, &row.data, &order.field)?.into_owned();
                Some((key, row))
            })
            .collect();

        keyed.sort_by(|(a_key, a_row), (b_key, b_row)| {
            let ordering = a_key
                .total_cmp(b_key)
                .then_with(|| a_row.id.cmp(&b_row.id));
            match order.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });

        keyed.into_iter().map(|(_, row)| row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, value: i64) -> Row {
        Row {
            id: id.to_string(),
            data: Document::new().with("value", value),
        }
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_sort_ascending() {
        let rows = vec![row("c", 30), row("a", 20), row("b", 25)];
        let sorted = ResultSorter::sort(rows, Some(&OrderSpec::asc("value")));
        assert_eq!(ids(&sorted), ["a", "b", "c"]);
    }

    #[test]
    fn test_sort_descending() {
        let rows = vec![row("c", 30), row("a", 20), row("b", 25)];
        let sorted = ResultSorter::sort(rows, Some(&OrderSpec::desc("value")));
        assert_eq!(ids(&sorted), ["c", "b", "a"]);
    }

    #[test]
    fn test_ties_break_on_id() {
        let rows = vec![row("b", 1), row("a", 1), row("c", 1)];
        let sorted = ResultSorter::sort(rows, Some(&OrderSpec::asc("value")));
        assert_eq!(ids(&sorted), ["a", "b", "c"]);
    }

    #[test]
    fn test_missing_order_field_excluded() {
        let rows = vec![
            row("a", 1),
            Row {
                id: "b".to_string(),
                data: Document::new().with("other", 1),
            },
        ];
        let sorted = ResultSorter::sort(rows, Some(&OrderSpec::asc("value")));
        assert_eq!(ids(&sorted), ["a"]);
    }

    #[test]
    fn test_no_order_keeps_input() {
        let rows = vec![row("a", 3), row("b", 1)];
        let sorted = ResultSorter::sort(rows, None);
        assert_eq!(ids(&sorted), ["a", "b"]);
    }
}
