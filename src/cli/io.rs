//! JSON I/O handling for CLI
//!
//! - Input: an optional query request object on stdin
//! - Output: a single JSON object on stdout
//! - UTF-8 only
//!
//! Request shape (every key optional):
//!
//! ```json
//! {
//!   "where": [["status", "==", "open"]],
//!   "range": {"field": "at", "start": {"$timestamp": "2024-05-01T00:00:00Z"},
//!             "end": {"$timestamp": "2024-05-02T00:00:00Z"}},
//!   "order": {"field": "value", "direction": "desc"},
//!   "limit": 10
//! }
//! ```

use std::io::{self, IsTerminal, Read, Write};

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::model::{FieldRef, Value};
use crate::query::{
    ComparisonOperator, Direction, OrderSpec, Predicate, QueryBuilder, QueryDescriptor, RangeSpec,
};

use super::errors::{CliError, CliResult};

/// Query request read from stdin
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryRequest {
    /// `[field, operator, value]` triples, applied in order
    #[serde(default, rename = "where")]
    pub clauses: Vec<(String, String, JsonValue)>,

    #[serde(default)]
    pub range: Option<RangeRequest>,

    #[serde(default)]
    pub order: Option<OrderRequest>,

    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeRequest {
    pub field: String,
    pub start: JsonValue,
    pub end: JsonValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderRequest {
    pub field: String,
    #[serde(default)]
    pub direction: Option<String>,
}

impl QueryRequest {
    /// Parses a request; blank input means "everything"
    pub fn parse(input: &str) -> CliResult<Self> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(input)?)
    }

    /// Builds the descriptor. The range, if any, follows the where clauses.
    pub fn to_descriptor(&self) -> CliResult<QueryDescriptor> {
        let mut builder = QueryBuilder::new();

        for (field, op, value) in &self.clauses {
            let op: ComparisonOperator = op.parse()?;
            builder = builder.with_predicate(Predicate::new(
                FieldRef::name(field.as_str()),
                op,
                Value::from_json(value.clone()),
            ));
        }

        if let Some(range) = &self.range {
            builder = builder.with_range(RangeSpec::new(
                FieldRef::name(range.field.as_str()),
                Value::from_json(range.start.clone()),
                Value::from_json(range.end.clone()),
            ));
        }

        if let Some(order) = &self.order {
            let direction = match order.direction.as_deref() {
                Some(direction) => direction.parse::<Direction>().map_err(|_| {
                    CliError::bad_request(format!("unknown direction '{}'", direction))
                })?,
                None => Direction::Ascending,
            };
            builder = builder.with_order(OrderSpec::new(FieldRef::name(order.field.as_str()), direction));
        }

        if let Some(limit) = self.limit {
            builder = builder.with_limit(limit);
        }

        Ok(builder.build()?)
    }
}

/// Read a query request from stdin. An interactive stdin counts as empty.
pub fn read_request() -> CliResult<QueryRequest> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(QueryRequest::default());
    }

    let mut input = String::new();
    stdin.read_to_string(&mut input)?;
    QueryRequest::parse(&input)
}

/// Write a success response to stdout
pub fn write_response(data: JsonValue) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });

    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &response)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write plain text to stdout
pub fn write_text(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", text)?;
    stdout.flush()?;

    Ok(())
}
