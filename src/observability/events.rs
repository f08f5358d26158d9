//! Observable events for duostore
//!
//! Every log line the facade emits carries one of these as its `event`
//! field. Events are explicit and typed.

use std::fmt;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,
    /// Tenant facade wired to its store
    TenantRegistered,

    // Query operations
    /// Fetch-once query returned a result set
    QueryExecuted,
    /// Fetch-once query failed
    QueryFailed,

    // Subscriptions
    /// Live registration established on first poll
    SubscriptionOpened,
    /// Snapshot delivered to the subscriber
    SubscriptionEmitted,
    /// Terminal error delivered to the subscriber
    SubscriptionFailed,
    /// Subscriber released the channel
    SubscriptionReleased,

    // Single documents
    /// Document read
    DocumentRead,
    /// Document created or merged
    DocumentWritten,
    /// Document deleted
    DocumentDeleted,
    /// Single-document operation failed
    DocumentFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::TenantRegistered => "TENANT_REGISTERED",

            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::QueryFailed => "QUERY_FAILED",

            Event::SubscriptionOpened => "SUBSCRIPTION_OPENED",
            Event::SubscriptionEmitted => "SUBSCRIPTION_EMITTED",
            Event::SubscriptionFailed => "SUBSCRIPTION_FAILED",
            Event::SubscriptionReleased => "SUBSCRIPTION_RELEASED",

            Event::DocumentRead => "DOCUMENT_READ",
            Event::DocumentWritten => "DOCUMENT_WRITTEN",
            Event::DocumentDeleted => "DOCUMENT_DELETED",
            Event::DocumentFailed => "DOCUMENT_FAILED",
        }
    }

    /// Returns true if this event reports a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::QueryFailed | Event::SubscriptionFailed | Event::DocumentFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
