// ============================================================================
// Rewrite Queue
// Corrective rewrites deferred until the host's native edit has committed
// ============================================================================

use crate::domain::{EditState, FieldId};
use std::collections::VecDeque;

/// A rewrite to run after the current event has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Replace the field text and place the caret
    Replace { text: String, cursor: usize },

    /// Check the text left by a native paste; restore `original` if it
    /// breaks the field's budget
    VerifyPaste { original: EditState },

    /// Switch a freshly focused field to its editing form
    Unsettle,
}

/// FIFO of pending rewrites, at most one per field.
///
/// Scheduling a rewrite for a field that already has one pending replaces
/// the old rewrite in place.
#[derive(Debug, Default)]
pub struct RewriteQueue {
    pending: VecDeque<(FieldId, Rewrite)>,
}

impl RewriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a rewrite, returning the one it superseded.
    pub fn schedule(&mut self, field: FieldId, rewrite: Rewrite) -> Option<Rewrite> {
        if let Some((_, slot)) = self.pending.iter_mut().find(|(id, _)| *id == field) {
            tracing::trace!(field = %field, "pending rewrite superseded");
            return Some(std::mem::replace(slot, rewrite));
        }
        self.pending.push_back((field, rewrite));
        None
    }

    /// Next rewrite in scheduling order.
    pub fn take(&mut self) -> Option<(FieldId, Rewrite)> {
        self.pending.pop_front()
    }

    /// Drop the rewrite pending for a field, if any.
    pub fn cancel(&mut self, field: &FieldId) -> Option<Rewrite> {
        let index = self.pending.iter().position(|(id, _)| id == field)?;
        self.pending.remove(index).map(|(_, rewrite)| rewrite)
    }

    pub fn pending_for(&self, field: &FieldId) -> Option<&Rewrite> {
        self.pending
            .iter()
            .find(|(id, _)| id == field)
            .map(|(_, rewrite)| rewrite)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
