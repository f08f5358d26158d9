//! Explain output for query descriptors
//!
//! Deterministic, human-readable. The one-line `Display` form of
//! [`QueryDescriptor`] is what the logs carry; [`ExplainQuery`] is the
//! block printed by the CLI.

use std::fmt;

use crate::errors::StoreError;
use crate::model::CollectionPath;

use super::descriptor::{Filter, QueryDescriptor};

impl fmt::Display for QueryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unconstrained() {
            return f.write_str("all");
        }

        let mut wrote = false;
        for (i, filter) in self.filters.iter().enumerate() {
            f.write_str(if i == 0 { "where " } else { " and " })?;
            match filter {
                Filter::Predicate(p) => write!(f, "{}", p)?,
                Filter::Range(r) => write!(f, "{} in [{}, {})", r.field, r.lower, r.upper)?,
            }
            wrote = true;
        }
        if let Some(order) = &self.order {
            if wrote {
                f.write_str(" ")?;
            }
            write!(f, "order by {} {}", order.field, order.direction.as_str())?;
            wrote = true;
        }
        if let Some(limit) = self.limit {
            if wrote {
                f.write_str(" ")?;
            }
            write!(f, "limit {}", limit)?;
        }
        Ok(())
    }
}

/// Explain output
#[derive(Debug, Clone)]
pub struct ExplainQuery {
    /// Target collection
    pub collection: String,
    /// Whether the descriptor was built
    pub accepted: bool,
    /// Store clauses, range expanded
    pub clauses: Vec<String>,
    /// Order description
    pub order: Option<String>,
    pub limit: Option<usize>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
}

impl ExplainQuery {
    /// Creates explain output for a built descriptor
    pub fn from_descriptor(collection: &CollectionPath, query: &QueryDescriptor) -> Self {
        Self {
            collection: collection.to_string(),
            accepted: true,
            clauses: query.where_clauses().iter().map(ToString::to_string).collect(),
            order: query
                .order()
                .map(|o| format!("{} {}", o.field, o.direction.as_str())),
            limit: query.limit(),
            rejection_code: None,
            rejection_reason: None,
        }
    }

    /// Creates explain output for a descriptor that failed to build
    pub fn from_error(collection: &CollectionPath, err: &StoreError) -> Self {
        Self {
            collection: collection.to_string(),
            accepted: false,
            clauses: Vec::new(),
            order: None,
            limit: None,
            rejection_code: Some(err.code().to_string()),
            rejection_reason: Some(err.to_string()),
        }
    }
}

impl fmt::Display for ExplainQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN QUERY ===")?;
        writeln!(f, "Collection: {}", self.collection)?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if !self.clauses.is_empty() {
                writeln!(f, "Where:")?;
                for clause in &self.clauses {
                    writeln!(f, "  - {}", clause)?;
                }
            }
            if let Some(order) = &self.order {
                writeln!(f, "Order: {}", order)?;
            }
            if let Some(limit) = self.limit {
                writeln!(f, "Limit: {}", limit)?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}
