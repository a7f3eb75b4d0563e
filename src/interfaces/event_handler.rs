// ============================================================================
// Event Handler Interface
// Defines the contract for observing field edits and recomputations
// ============================================================================

use crate::domain::{FieldId, Key, NumberFormat, Operation};
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the field controller
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FieldEvent {
    /// Key-down suppressed by the keystroke validator
    KeyRejected {
        field: FieldId,
        key: Key,
        timestamp: DateTime<Utc>,
    },

    /// Deferred corrective rewrite written to the field
    RewriteApplied {
        field: FieldId,
        value: String,
        timestamp: DateTime<Utc>,
    },

    /// Pasted text violated the field's budget and was undone
    PasteRolledBack {
        field: FieldId,
        rejected: String,
        timestamp: DateTime<Utc>,
    },

    /// Field canonicalized on blur or during initialization
    Settled {
        field: FieldId,
        value: String,
        timestamp: DateTime<Utc>,
    },

    /// Derived field recomputed from its sources
    DerivedRecomputed {
        field: FieldId,
        operation: Operation,
        value: String,
        timestamp: DateTime<Utc>,
    },

    /// Separator convention switched at runtime
    FormatChanged {
        format: NumberFormat,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing field events
/// Implementations can handle logging, metrics, audit trails, etc.
pub trait EventHandler: Send + Sync {
    /// Handle a field event
    fn on_event(&self, event: FieldEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<FieldEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: FieldEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: FieldEvent) {
        tracing::debug!("Field event: {:?}", event);
    }
}
