//! Observability for duostore
//!
//! Structured logging through `tracing`. Each line carries a typed
//! [`Event`] name plus the project and collection it concerns.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Failures are logged, then passed through unchanged
//! 3. Subscriber installation belongs to the binary, never the library
//!
//! # Usage
//!
//! ```ignore
//! use duostore::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::TenantRegistered, &[("tenant", "projectOne")]);
//! ```

mod events;

pub use events::Event;

use tracing::{debug, error, info, warn};

use crate::errors::StoreError;

/// Log a lifecycle event with fields. Failure events go out at warn.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let fields = render_fields(fields);
    if event.is_failure() {
        warn!(event = %event, %fields);
    } else {
        info!(event = %event, %fields);
    }
}

/// Log a failed store operation at a level matching its severity.
///
/// Absent documents are routine, rejected queries and permission failures
/// are caller problems, outages are errors.
pub fn log_store_failure(event: Event, project: &str, collection: &str, err: &StoreError) {
    let code = err.code();
    match err {
        StoreError::NotFound { .. } => {
            debug!(event = %event, project, collection, code, error = %err)
        }
        StoreError::QueryRejected(_) | StoreError::PermissionDenied(_) => {
            warn!(event = %event, project, collection, code, error = %err)
        }
        StoreError::Unavailable(_) => {
            error!(event = %event, project, collection, code, error = %err)
        }
    }
}

fn render_fields(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}
